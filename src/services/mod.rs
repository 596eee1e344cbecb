pub mod allocator;
pub mod analytics_service;
pub mod gate;
pub mod link_service;
pub mod quota;
pub mod redirect;

pub use allocator::TokenAllocator;
pub use analytics_service::AnalyticsService;
pub use link_service::LinkService;
pub use quota::QuotaGuard;
pub use redirect::{RedirectService, ResolveOutcome};
