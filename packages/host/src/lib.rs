//! External-collaborator interfaces (§6): the markup tokenizer, the expression parser,
//! module resolution, view-model reflection, and the host type-checker used for
//! overlay generation. This crate ships trait definitions plus a minimal in-memory
//! reference implementation (`memory`) used by the other two crates' test suites — it
//! is not meant to be a production parser.

pub mod expr;
pub mod markup;
pub mod memory;
pub mod reflect;
pub mod resolver;
pub mod typecheck;

pub use expr::ExprParser;
pub use markup::MarkupParser;
pub use reflect::VmReflection;
pub use resolver::ModuleResolver;
pub use typecheck::HostTypeChecker;
