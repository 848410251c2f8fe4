//! Hand and Deck Commitments
//!
//! - `merkle`: Binary Merkle tree over leaf bytes
//! - `collection`: Private ordered collections and their salted roots
//! - `store`: Public per-player roots and sizes

pub mod merkle;
pub mod collection;
pub mod store;

pub use merkle::MerkleTree;
pub use collection::{CardCollection, CollectionKind, collection_root};
pub use store::Commitments;
