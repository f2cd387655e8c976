//! MedX65 medical-office API node: agenda, contacts, patients, users and
//! sectors behind a single integration token.

pub mod client;
pub mod credentials;
pub mod node;
pub mod operation;

pub use client::{BearerToken, MedX65Client};
pub use credentials::{Credential, Environment};
pub use node::{MedX65Node, MedX65Session};
pub use operation::{Operation, OperationKind, OperationRequest, Resource};
