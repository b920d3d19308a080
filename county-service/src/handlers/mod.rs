pub mod counties;
pub mod health;

pub use counties::{
    create_county, delete_county, get_county, list_all_counties, list_counties, update_county,
};
pub use health::health_check;
