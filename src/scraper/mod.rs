pub mod fetcher;

pub use fetcher::{Fetch, PhoneFetcher};
