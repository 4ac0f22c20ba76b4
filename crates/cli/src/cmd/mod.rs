mod describe;

pub use describe::{DescribeCommand, cmd_describe};
