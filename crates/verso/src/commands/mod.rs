//! CLI command implementations.

mod args;
pub(crate) mod assemble;
pub(crate) mod dropdown;

pub(crate) use assemble::AssembleArgs;
pub(crate) use dropdown::DropdownArgs;
