pub mod company;
pub mod county;

pub use company::Company;
pub use county::{CompanyRef, County};
