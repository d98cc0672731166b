//! Component G: the five-stage template compilation pipeline — lower, link, bind,
//! typecheck, plan & emit. Each stage consumes the previous stage's output type and
//! produces the next; cancellation is cooperative at these stage boundaries (§5).

pub mod bind;
pub mod link;
pub mod lower;
pub mod plan_emit;
pub mod typecheck;

pub use bind::bind;
pub use link::{link, LinkOutput};
pub use lower::{lower, LowerInput};
pub use plan_emit::{plan_and_emit, EmitOptions, Plan};
pub use typecheck::{typecheck, TypecheckOutput};
