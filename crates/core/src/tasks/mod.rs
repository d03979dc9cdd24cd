//! Declarative task catalog and the shell lines it produces

pub mod builders;
pub mod catalog;
pub mod context;
pub mod spec;

pub use catalog::{COMMAND_SEPARATOR, CommandEnv, TaskCatalog, UPDATE_CONTAINER, default_tasks};
pub use context::{BuildContext, container_path};
pub use spec::{
    AllTargetsPolicy, BuilderSet, CommandBuilder, Requirement, TaskGroup, TaskSpec, TaskState,
};
