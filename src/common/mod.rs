pub mod error;
pub mod types;
pub mod view;

pub use error::{Result, SelectorError};
pub use types::MemberId;
pub use view::ClusterView;
