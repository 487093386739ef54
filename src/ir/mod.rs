pub mod replayer;

pub use replayer::{CommandReplayer, Replayer};
