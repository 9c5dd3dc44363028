pub mod fetcher;

pub use fetcher::{BROWSER_USER_AGENT, ReqwestFetcher};
