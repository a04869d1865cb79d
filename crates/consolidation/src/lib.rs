//! The EIP-7251 consolidation engine: eligibility evaluation, fee
//! computation, and unsigned transaction payload assembly.

pub mod chain;
pub mod consts;
pub mod eligibility;
pub mod fee;
pub mod payload;

pub use eligibility::{
    is_consolidable, validate_consolidation, InvalidValidator, ValidationOutcome,
};
pub use fee::{consolidation_fee, queue_length, required_fee};
pub use payload::{build_consolidation_payloads, ConsolidationPayload, TransactionPayload};
