//! A balanced multi-way search tree over `i32` keys with a configurable
//! minimum degree `t`, plus the driver used to benchmark it.
//!
//! ```
//! use balanced_tree::BalancedTree;
//!
//! let mut tree = BalancedTree::new(2)?;
//! for key in [10, 20, 30, 40, 50] {
//!     tree.insert(key);
//! }
//! assert!(tree.search(30));
//! tree.remove(30)?;
//! assert_eq!(tree.traverse(), vec![10, 20, 40, 50]);
//! # Ok::<(), balanced_tree::TreeError>(())
//! ```

pub mod bench;
pub mod config;
pub mod error;
pub mod keygen;
pub mod node;
pub mod tree;

pub use config::BenchConfig;
pub use error::{BenchError, ConfigError, KeyGenError, TreeError};
pub use node::{Keys, Node};
pub use tree::BalancedTree;
