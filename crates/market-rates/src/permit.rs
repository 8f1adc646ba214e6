// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! EIP-2612 permit payloads for approving a market to spend tokens without a separate
//! `approve` transaction.
//!
//! This module only builds the typed data, its digest and the final `permit` call. Signing is
//! left to the wallet.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};

/// Lifetime of a permit signature, in seconds.
pub const PERMIT_VALIDITY: u64 = 3600;

sol! {
    /// The EIP-2612 `Permit` message.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }

    /// ERC-20 tokens supporting EIP-2612.
    interface IERC20Permit {
        function name() external view returns (string);
        function nonces(address owner) external view returns (uint256);
        function permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
    }
}

/// Errors when decoding a wallet signature.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PermitError {
    #[error("invalid signature length: {0}")]
    InvalidLength(usize),
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
}

/// Returns the EIP-712 domain of a permit token.
///
/// The domain deliberately carries no `version` field, matching the tokens this is used with.
pub fn permit_domain(name: String, chain_id: u64, token: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(name.into()),
        None,
        Some(U256::from(chain_id)),
        Some(token),
        None,
    )
}

/// A permit for a spender, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitRequest {
    pub permit: Permit,
}

impl PermitRequest {
    /// Creates an unlimited allowance for `spender`, valid for [PERMIT_VALIDITY] seconds after
    /// `now`.
    pub fn unlimited(owner: Address, spender: Address, nonce: U256, now: u64) -> Self {
        Self {
            permit: Permit {
                owner,
                spender,
                value: U256::MAX,
                nonce,
                deadline: U256::from(now.saturating_add(PERMIT_VALIDITY)),
            },
        }
    }

    /// Returns the EIP-712 digest the owner has to sign.
    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.permit.eip712_signing_hash(domain)
    }

    /// Builds the `permit` call from the owner's signature.
    pub fn into_call(self, v: u8, r: B256, s: B256) -> IERC20Permit::permitCall {
        IERC20Permit::permitCall {
            owner: self.permit.owner,
            spender: self.permit.spender,
            value: self.permit.value,
            deadline: self.permit.deadline,
            v,
            r,
            s,
        }
    }
}

/// Splits a wallet signature into its `(v, r, s)` components.
///
/// Accepts both the 65-byte `r || s || v` encoding, with `v` in `{0, 1, 27, 28}`, and the 64-byte
/// compact encoding of EIP-2098. The returned `v` is always 27 or 28.
pub fn split_signature(signature: &[u8]) -> Result<(u8, B256, B256), PermitError> {
    match signature.len() {
        65 => {
            let r = B256::from_slice(&signature[..32]);
            let s = B256::from_slice(&signature[32..64]);
            let v = match signature[64] {
                v @ (0 | 1) => v + 27,
                v @ (27 | 28) => v,
                v => return Err(PermitError::InvalidRecoveryId(v)),
            };
            Ok((v, r, s))
        }
        64 => {
            let r = B256::from_slice(&signature[..32]);
            let mut s = B256::from_slice(&signature[32..]);
            let v = 27 + (s[0] >> 7);
            s[0] &= 0x7f;
            Ok((v, r, s))
        }
        len => Err(PermitError::InvalidLength(len)),
    }
}
