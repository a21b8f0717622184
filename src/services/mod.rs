pub mod application_service;
pub mod company_service;
pub mod job_filter;
pub mod job_offer_service;
pub mod notification_service;
pub mod pagination;
pub mod profile_service;
pub mod response_cache;
pub mod seed_service;
pub mod user_service;
