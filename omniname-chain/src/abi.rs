//! Minimal ABI codec for the engine's contract surface.
//!
//! The engine only ever talks to a small, fixed set of externally-defined
//! contracts (hub, registries, resolvers, multicall, protocol readers), so
//! this codec covers exactly the types those ABIs use: address, uint256,
//! bool, bytes32, bytes, string, dynamic arrays, and tuples. Offsets follow
//! the standard head/tail layout.

use sha3::{Digest, Keccak256};

use omniname_core::error::{OmniNameError, Result};

/// One ABI value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// 20-byte account address as a 0x-prefixed hex string.
    Address(String),
    /// uint256 as big-endian bytes.
    Uint([u8; 32]),
    /// Boolean flag.
    Bool(bool),
    /// bytes32 value.
    FixedBytes([u8; 32]),
    /// Dynamic byte string.
    Bytes(Vec<u8>),
    /// UTF-8 string.
    Str(String),
    /// Dynamic array of homogeneous tokens.
    Array(Vec<Token>),
    /// Tuple (struct) of tokens.
    Tuple(Vec<Token>),
}

impl Token {
    /// Builds a uint256 token from a u64.
    pub fn uint(value: u64) -> Self {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        Token::Uint(word)
    }

    /// Builds a uint256 token from raw big-endian bytes (e.g. a keccak hash
    /// interpreted as a token id).
    pub fn uint_bytes(word: [u8; 32]) -> Self {
        Token::Uint(word)
    }

    /// Reads an address token.
    pub fn as_address(&self) -> Result<String> {
        match self {
            Token::Address(a) => Ok(a.clone()),
            other => Err(decode_err(format!("expected address, got {other:?}"))),
        }
    }

    /// Reads a uint256 token, range-checked into u64.
    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Token::Uint(word) => {
                if word[..24].iter().any(|&b| b != 0) {
                    return Err(decode_err("uint256 out of u64 range".into()));
                }
                Ok(u64::from_be_bytes(word[24..].try_into().expect("8 bytes")))
            }
            other => Err(decode_err(format!("expected uint, got {other:?}"))),
        }
    }

    /// Reads a string token.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Token::Str(s) => Ok(s),
            other => Err(decode_err(format!("expected string, got {other:?}"))),
        }
    }

    /// Reads a bytes token.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Token::Bytes(b) => Ok(b),
            other => Err(decode_err(format!("expected bytes, got {other:?}"))),
        }
    }

    /// Reads a bool token.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Token::Bool(b) => Ok(*b),
            other => Err(decode_err(format!("expected bool, got {other:?}"))),
        }
    }

    /// Reads an array token.
    pub fn as_array(&self) -> Result<&[Token]> {
        match self {
            Token::Array(items) => Ok(items),
            other => Err(decode_err(format!("expected array, got {other:?}"))),
        }
    }

    /// Reads a tuple token.
    pub fn as_tuple(&self) -> Result<&[Token]> {
        match self {
            Token::Tuple(items) => Ok(items),
            other => Err(decode_err(format!("expected tuple, got {other:?}"))),
        }
    }
}

/// One ABI type, for decoding.
#[derive(Clone, Debug)]
pub enum Param {
    /// address
    Address,
    /// uint256
    Uint,
    /// bool
    Bool,
    /// bytes32
    FixedBytes,
    /// bytes
    Bytes,
    /// string
    Str,
    /// T[]
    Array(Box<Param>),
    /// (T1, T2, ...)
    Tuple(Vec<Param>),
}

fn decode_err(msg: String) -> OmniNameError {
    OmniNameError::AbiDecode(msg)
}

/// Computes the 4-byte selector of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

fn is_dynamic_token(token: &Token) -> bool {
    match token {
        Token::Bytes(_) | Token::Str(_) | Token::Array(_) => true,
        Token::Tuple(members) => members.iter().any(is_dynamic_token),
        _ => false,
    }
}

fn head_size_token(token: &Token) -> usize {
    if is_dynamic_token(token) {
        32
    } else if let Token::Tuple(members) = token {
        members.iter().map(head_size_token).sum()
    } else {
        32
    }
}

fn word_usize(value: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn pad_right(data: &[u8]) -> Vec<u8> {
    let mut padded = data.to_vec();
    let rem = data.len() % 32;
    if rem != 0 {
        padded.resize(data.len() + 32 - rem, 0);
    }
    padded
}

fn encode_static(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::Address(addr) => {
            let mut word = [0u8; 32];
            let raw = hex::decode(addr.trim_start_matches("0x")).unwrap_or_default();
            if raw.len() == 20 {
                word[12..].copy_from_slice(&raw);
            }
            out.extend_from_slice(&word);
        }
        Token::Uint(word) | Token::FixedBytes(word) => out.extend_from_slice(word),
        Token::Bool(b) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            out.extend_from_slice(&word);
        }
        Token::Tuple(members) => {
            for member in members {
                encode_static(member, out);
            }
        }
        _ => unreachable!("dynamic token in static position"),
    }
}

fn encode_tail(token: &Token) -> Vec<u8> {
    match token {
        Token::Bytes(data) => {
            let mut out = word_usize(data.len()).to_vec();
            out.extend(pad_right(data));
            out
        }
        Token::Str(s) => {
            let mut out = word_usize(s.len()).to_vec();
            out.extend(pad_right(s.as_bytes()));
            out
        }
        Token::Array(items) => {
            let mut out = word_usize(items.len()).to_vec();
            out.extend(encode_tokens(items));
            out
        }
        Token::Tuple(members) => encode_tokens(members),
        _ => unreachable!("static token in tail position"),
    }
}

/// Encodes a token sequence with the standard head/tail layout.
pub fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let head_size: usize = tokens.iter().map(head_size_token).sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail: Vec<u8> = Vec::new();
    for token in tokens {
        if is_dynamic_token(token) {
            head.extend_from_slice(&word_usize(head_size + tail.len()));
            tail.extend(encode_tail(token));
        } else {
            encode_static(token, &mut head);
        }
    }
    head.extend(tail);
    head
}

/// Encodes a full contract call: selector plus arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend(encode_tokens(args));
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECODING
// ═══════════════════════════════════════════════════════════════════════════════

fn is_dynamic_param(param: &Param) -> bool {
    match param {
        Param::Bytes | Param::Str | Param::Array(_) => true,
        Param::Tuple(members) => members.iter().any(is_dynamic_param),
        _ => false,
    }
}

fn head_size_param(param: &Param) -> usize {
    if is_dynamic_param(param) {
        32
    } else if let Param::Tuple(members) = param {
        members.iter().map(head_size_param).sum()
    } else {
        32
    }
}

fn read_word(frame: &[u8], pos: usize) -> Result<[u8; 32]> {
    frame
        .get(pos..pos + 32)
        .map(|slice| slice.try_into().expect("32 bytes"))
        .ok_or_else(|| decode_err(format!("truncated data at offset {pos}")))
}

fn read_offset(frame: &[u8], pos: usize) -> Result<usize> {
    let word = read_word(frame, pos)?;
    if word[..24].iter().any(|&b| b != 0) {
        return Err(decode_err("offset out of range".into()));
    }
    let value = u64::from_be_bytes(word[24..].try_into().expect("8 bytes")) as usize;
    if value > frame.len() {
        return Err(decode_err(format!("offset {value} beyond frame")));
    }
    Ok(value)
}

fn decode_static(frame: &[u8], pos: &mut usize, param: &Param) -> Result<Token> {
    match param {
        Param::Address => {
            let word = read_word(frame, *pos)?;
            *pos += 32;
            Ok(Token::Address(format!("0x{}", hex::encode(&word[12..]))))
        }
        Param::Uint => {
            let word = read_word(frame, *pos)?;
            *pos += 32;
            Ok(Token::Uint(word))
        }
        Param::Bool => {
            let word = read_word(frame, *pos)?;
            *pos += 32;
            Ok(Token::Bool(word[31] != 0))
        }
        Param::FixedBytes => {
            let word = read_word(frame, *pos)?;
            *pos += 32;
            Ok(Token::FixedBytes(word))
        }
        Param::Tuple(members) => {
            let mut out = Vec::with_capacity(members.len());
            for member in members {
                out.push(decode_static(frame, pos, member)?);
            }
            Ok(Token::Tuple(out))
        }
        _ => Err(decode_err("dynamic param in static position".into())),
    }
}

fn decode_dynamic(tail: &[u8], param: &Param) -> Result<Token> {
    match param {
        Param::Bytes | Param::Str => {
            let len = read_offset(tail, 0)?;
            let data = tail
                .get(32..32 + len)
                .ok_or_else(|| decode_err("truncated dynamic data".into()))?;
            if matches!(param, Param::Str) {
                let text = String::from_utf8(data.to_vec())
                    .map_err(|e| decode_err(format!("invalid utf-8 string: {e}")))?;
                Ok(Token::Str(text))
            } else {
                Ok(Token::Bytes(data.to_vec()))
            }
        }
        Param::Array(element) => {
            let len = read_offset(tail, 0)?;
            let frame = &tail[32..];
            let params = vec![(**element).clone(); len];
            Ok(Token::Array(decode_frame(frame, &params)?))
        }
        Param::Tuple(members) => Ok(Token::Tuple(decode_frame(tail, members)?)),
        _ => Err(decode_err("static param in dynamic position".into())),
    }
}

fn decode_frame(frame: &[u8], params: &[Param]) -> Result<Vec<Token>> {
    let mut out = Vec::with_capacity(params.len());
    let mut pos = 0;
    for param in params {
        if is_dynamic_param(param) {
            let offset = read_offset(frame, pos)?;
            out.push(decode_dynamic(&frame[offset..], param)?);
            pos += 32;
        } else {
            out.push(decode_static(frame, &mut pos, param)?);
        }
    }
    Ok(out)
}

/// Decodes return data against the expected output parameter list.
pub fn decode(data: &[u8], params: &[Param]) -> Result<Vec<Token>> {
    if data.is_empty() && !params.is_empty() {
        return Err(decode_err("empty return data".into()));
    }
    decode_frame(data, params)
}

/// Decodes a single-address return.
pub fn decode_address(data: &[u8]) -> Result<String> {
    decode(data, &[Param::Address])?[0].as_address()
}

/// Decodes a single-string return.
pub fn decode_string(data: &[u8]) -> Result<String> {
    Ok(decode(data, &[Param::Str])?[0].as_str()?.to_string())
}

/// Decodes a single-bytes return.
pub fn decode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    Ok(decode(data, &[Param::Bytes])?[0].as_bytes()?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    // Well-known resolver/registry selectors, fixed by their deployed ABIs.
    #[test_case("resolver(bytes32)", "0178b8bf")]
    #[test_case("addr(bytes32)", "3b3b57de")]
    #[test_case("name(bytes32)", "691f3431")]
    #[test_case("text(bytes32,string)", "59d1d43c")]
    #[test_case("contenthash(bytes32)", "bc1c58d1")]
    #[test_case("aggregate3((address,bool,bytes)[])", "82ad56cb")]
    fn test_known_selectors(signature: &str, expected: &str) {
        assert_eq!(hex::encode(selector(signature)), expected);
    }

    #[test]
    fn test_encode_static_args() {
        let node = [0x11u8; 32];
        let data = encode_call("resolver(bytes32)", &[Token::FixedBytes(node)]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &selector("resolver(bytes32)"));
        assert_eq!(&data[4..36], &node);
    }

    #[test]
    fn test_encode_string_arg_layout() {
        let data = encode_tokens(&[Token::FixedBytes([0xaa; 32]), Token::Str("avatar".into())]);
        // head: bytes32 word + offset word, tail: length word + padded data
        assert_eq!(data.len(), 32 + 32 + 32 + 32);
        assert_eq!(data[63], 64, "offset points past the two head words");
        assert_eq!(data[95], 6, "string length");
        assert_eq!(&data[96..102], b"avatar");
    }

    #[test]
    fn test_address_roundtrip() {
        let addr = "0xabcdef0123456789abcdef0123456789abcdef01";
        let encoded = encode_tokens(&[Token::Address(addr.into())]);
        let decoded = decode(&encoded, &[Param::Address]).unwrap();
        assert_eq!(decoded[0].as_address().unwrap(), addr);
    }

    #[test]
    fn test_uint_roundtrip_and_range_check() {
        let encoded = encode_tokens(&[Token::uint(56)]);
        let decoded = decode(&encoded, &[Param::Uint]).unwrap();
        assert_eq!(decoded[0].as_u64().unwrap(), 56);

        let big = Token::uint_bytes([0xff; 32]);
        let encoded = encode_tokens(&[big]);
        let decoded = decode(&encoded, &[Param::Uint]).unwrap();
        assert!(decoded[0].as_u64().is_err());
    }

    #[test]
    fn test_string_array_roundtrip() {
        let tokens = vec![Token::Array(vec![
            Token::Str("bnb".into()),
            Token::Str("arb".into()),
            Token::Str("".into()),
        ])];
        let encoded = encode_tokens(&tokens);
        let decoded = decode(&encoded, &[Param::Array(Box::new(Param::Str))]).unwrap();
        let items = decoded[0].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_str().unwrap(), "bnb");
        assert_eq!(items[2].as_str().unwrap(), "");
    }

    #[test]
    fn test_dynamic_tuple_array_roundtrip() {
        // Mirrors the hub's TldInfo[] return shape.
        let info = |tld: &str, id: u64| {
            Token::Tuple(vec![
                Token::Str(tld.into()),
                Token::uint(id),
                Token::uint(56),
                Token::Address("0x1111111111111111111111111111111111111111".into()),
                Token::Str("https://rpc.example".into()),
                Token::Address("0x0000000000000000000000000000000000000000".into()),
            ])
        };
        let encoded = encode_tokens(&[Token::Array(vec![info("bnb", 0), info("abc", 7)])]);
        let shape = Param::Array(Box::new(Param::Tuple(vec![
            Param::Str,
            Param::Uint,
            Param::Uint,
            Param::Address,
            Param::Str,
            Param::Address,
        ])));
        let decoded = decode(&encoded, &[shape]).unwrap();
        let items = decoded[0].as_array().unwrap();
        assert_eq!(items.len(), 2);
        let second = items[1].as_tuple().unwrap();
        assert_eq!(second[0].as_str().unwrap(), "abc");
        assert_eq!(second[1].as_u64().unwrap(), 7);
    }

    #[test]
    fn test_multicall_shapes_roundtrip() {
        let calls = Token::Array(vec![Token::Tuple(vec![
            Token::Address("0x2222222222222222222222222222222222222222".into()),
            Token::Bool(true),
            Token::Bytes(vec![0x01, 0x02, 0x03]),
        ])]);
        let encoded = encode_tokens(&[calls]);
        let shape = Param::Array(Box::new(Param::Tuple(vec![
            Param::Address,
            Param::Bool,
            Param::Bytes,
        ])));
        let decoded = decode(&encoded, &[shape]).unwrap();
        let entry = decoded[0].as_array().unwrap()[0].as_tuple().unwrap();
        assert!(entry[1].as_bool().unwrap());
        assert_eq!(entry[2].as_bytes().unwrap(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        assert!(decode(&[0u8; 16], &[Param::Uint]).is_err());
        assert!(decode(&[], &[Param::Str]).is_err());

        // Offset pointing beyond the frame
        let mut bad = word_usize(4096).to_vec();
        bad.extend_from_slice(&[0u8; 32]);
        assert!(decode(&bad, &[Param::Str]).is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_utf8() {
        let mut data = word_usize(32).to_vec(); // offset
        data.extend_from_slice(&word_usize(2)); // length
        let mut chunk = [0u8; 32];
        chunk[0] = 0xff;
        chunk[1] = 0xfe;
        data.extend_from_slice(&chunk);
        assert!(decode(&data, &[Param::Str]).is_err());
    }
}
