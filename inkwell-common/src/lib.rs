pub mod listing;
pub mod model;
pub mod policy;
pub mod util;
