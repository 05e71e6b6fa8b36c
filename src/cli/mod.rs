mod args;

pub use args::{parse_ext_list, Cli, Commands, CommonOptions, HarvestArgs, SyncArgs};
