//! Smart-protocol plumbing for `push`: pkt-line framing, the ref
//! advertisement, in-memory pack building, and report-status parsing.

pub mod pack;
pub mod pkt_line;
pub mod receive_pack;
