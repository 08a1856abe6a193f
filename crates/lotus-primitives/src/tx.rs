//! Bitcoin-compatible transaction wire format (§6).

use crate::error::PrimitivesError;
use crate::varint;

/// `(prev_txid, prev_index)` — identifies the output being spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutPoint {
    /// Internal byte order, as stored on the wire (little-endian), not the
    /// reversed display order used by block explorers.
    pub prev_txid: [u8; 32],
    pub prev_index: u32,
}

impl OutPoint {
    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.prev_txid);
        out.extend_from_slice(&self.prev_index.to_le_bytes());
    }

    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        if bytes.len() < 36 {
            return Err(PrimitivesError::InvalidEncoding("truncated outpoint".into()));
        }
        let mut prev_txid = [0u8; 32];
        prev_txid.copy_from_slice(&bytes[..32]);
        let prev_index = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
        Ok((
            OutPoint {
                prev_txid,
                prev_index,
            },
            36,
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub prev_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn serialize(&self, out: &mut Vec<u8>) {
        self.prev_output.serialize(out);
        out.extend_from_slice(&varint::encode_with_len_prefix(&self.script_sig));
        out.extend_from_slice(&self.sequence.to_le_bytes());
    }

    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        let (prev_output, mut offset) = OutPoint::parse(bytes)?;
        let (script_len, consumed) = varint::decode(&bytes[offset..])?;
        offset += consumed;
        let script_len = script_len as usize;
        let script_sig = bytes
            .get(offset..offset + script_len)
            .ok_or_else(|| PrimitivesError::InvalidEncoding("truncated scriptSig".into()))?
            .to_vec();
        offset += script_len;
        let sequence = u32::from_le_bytes(
            bytes
                .get(offset..offset + 4)
                .ok_or_else(|| PrimitivesError::InvalidEncoding("truncated sequence".into()))?
                .try_into()
                .unwrap(),
        );
        offset += 4;
        Ok((
            TxIn {
                prev_output,
                script_sig,
                sequence,
            },
            offset,
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub value_sats: u64,
    pub script: Vec<u8>,
}

impl TxOut {
    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value_sats.to_le_bytes());
        out.extend_from_slice(&varint::encode_with_len_prefix(&self.script));
    }

    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        if bytes.len() < 8 {
            return Err(PrimitivesError::InvalidEncoding("truncated output value".into()));
        }
        let value_sats = u64::from_le_bytes(bytes[..8].try_into().unwrap());
        let (script_len, consumed) = varint::decode(&bytes[8..])?;
        let offset = 8 + consumed;
        let script_len = script_len as usize;
        let script = bytes
            .get(offset..offset + script_len)
            .ok_or_else(|| PrimitivesError::InvalidEncoding("truncated output script".into()))?
            .to_vec();
        Ok((
            TxOut {
                value_sats,
                script,
            },
            offset + script_len,
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub locktime: u32,
}

impl Transaction {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&varint::encode(self.inputs.len() as u64));
        for input in &self.inputs {
            input.serialize(&mut out);
        }
        out.extend_from_slice(&varint::encode(self.outputs.len() as u64));
        for output in &self.outputs {
            output.serialize(&mut out);
        }
        out.extend_from_slice(&self.locktime.to_le_bytes());
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < 4 {
            return Err(PrimitivesError::InvalidEncoding("truncated version".into()));
        }
        let version = u32::from_le_bytes(bytes[..4].try_into().unwrap());
        let mut offset = 4;

        let (n_inputs, consumed) = varint::decode(&bytes[offset..])?;
        offset += consumed;
        let mut inputs = Vec::with_capacity(n_inputs as usize);
        for _ in 0..n_inputs {
            let (input, consumed) = TxIn::parse(&bytes[offset..])?;
            offset += consumed;
            inputs.push(input);
        }

        let (n_outputs, consumed) = varint::decode(&bytes[offset..])?;
        offset += consumed;
        let mut outputs = Vec::with_capacity(n_outputs as usize);
        for _ in 0..n_outputs {
            let (output, consumed) = TxOut::parse(&bytes[offset..])?;
            offset += consumed;
            outputs.push(output);
        }

        if bytes.len() < offset + 4 {
            return Err(PrimitivesError::InvalidEncoding("truncated locktime".into()));
        }
        let locktime = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());

        Ok(Transaction {
            version,
            inputs,
            outputs,
            locktime,
        })
    }
}
