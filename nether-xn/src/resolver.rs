//! Root-node addressing
//!
//! Every pointer stored in a container is a u32 offset relative to the
//! container's root node address. The resolver owns that address plus, on
//! the write side, the running list of pointer-slot positions that must be
//! emitted into the relocation table.

use crate::error::XnError;
use crate::Result;

/// Translates stored offsets to virtual addresses and back, and collects
/// the pointer slots pending relocation
#[derive(Debug, Default)]
pub struct AddressResolver {
    root: Option<u32>,
    pending: Vec<u32>,
}

impl AddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root node address. Allowed exactly once per container pass.
    pub fn set_root(&mut self, address: u32) -> Result<()> {
        if self.root.is_some() {
            return Err(XnError::RootAddressAlreadySet);
        }
        self.root = Some(address);
        Ok(())
    }

    pub fn is_rooted(&self) -> bool {
        self.root.is_some()
    }

    /// Root node address; zero until set
    pub fn root(&self) -> u32 {
        self.root.unwrap_or(0)
    }

    /// Stored offset -> virtual address
    pub fn resolve(&self, stored: u32) -> u32 {
        stored.wrapping_add(self.root())
    }

    /// Virtual address -> stored offset
    pub fn unresolve(&self, virtual_address: u32) -> u32 {
        virtual_address.wrapping_sub(self.root())
    }

    /// Record a root-relative pointer-slot position for the relocation table
    pub fn record(&mut self, relative_position: u32) {
        self.pending.push(relative_position);
    }

    pub fn pending(&self) -> &[u32] {
        &self.pending
    }

    /// Drain the pending list, sorted ascending and deduplicated, ready for
    /// the relocation codec
    pub fn take_sorted(&mut self) -> Vec<u32> {
        let mut table = std::mem::take(&mut self.pending);
        table.sort_unstable();
        table.dedup();
        table
    }
}
