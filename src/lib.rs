pub mod common;
pub mod configuration;
pub mod dispatcher;
pub mod selection_method;
pub mod selector;
pub mod utils;

pub mod prelude {
    pub use crate::common::{ClusterView, MemberId, SelectorError};
    pub use crate::configuration::Settings;
    pub use crate::dispatcher::{AttemptFailure, DispatchError, Dispatcher};
    pub use crate::selection_method::{SelectionPolicy, SelectionStrategy};
    pub use crate::selector::{MemberSelector, SelectorHandle, SelectorState};
}
