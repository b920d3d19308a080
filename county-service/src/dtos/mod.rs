pub mod counties;
pub mod lenient;
pub mod payload;

pub use counties::{
    expand_company_refs, ApiResponse, CountyListParams, CountyListResponse, CountyResponse,
};
pub use lenient::{decode_lenient, Lenient};
pub use payload::{CountyPayload, UploadedFile};
