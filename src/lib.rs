//! Public library API for decoding .NET remoting binary (MS-NRBF) streams.

/// Record reading, graph distillation, and cine slice extraction.
pub mod nrbf;
