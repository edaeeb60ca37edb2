//! Action event model: the records producers report and the engine tracks.

mod record;
mod value;

pub use record::{
    ActionError, ActionId, ActionProgress, ActionRecord, ActionState, ActionUpdate, ErrorKind,
    Progress,
};
pub use value::{Arg, ArgValue, ResultData};
