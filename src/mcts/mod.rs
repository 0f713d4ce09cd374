//! Monte Carlo Tree Search
//!
//! An alternative to alpha-beta that needs no evaluation function: the
//! statistics of random playouts decide the move. The tree is kept between
//! turns and can be trained offline, saved and reloaded.

pub mod node;
pub mod search;
pub mod tree;

pub use node::{Node, NodeId};
pub use search::{MctsConfig, MctsSearcher};
pub use tree::{MoveStats, Tree};
