//! Hostile peers: what each attack costs the attacker and what the node keeps.
//!
//! - `malformed_payloads`: undecodable or empty gossip
//! - `forged_signatures`: well-formed data that fails authentication
//! - `flooding`: valid data sent faster than the quotas allow

mod flooding;
mod forged_signatures;
mod malformed_payloads;
