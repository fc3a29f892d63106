use std::{collections::HashMap, fmt};

use bstr::ByteSlice;

pub type Dictionary = HashMap<Vec<u8>, BencodeValue>;

/// A decoded bencode value.
#[derive(Clone, PartialEq, Eq)]
pub enum BencodeValue {
    Integer(i64),
    ByteString(Vec<u8>),
    List(Vec<BencodeValue>),
    Dictionary(Dictionary),
}

impl BencodeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            BencodeValue::Integer(_) => "Integer",
            BencodeValue::ByteString(_) => "String",
            BencodeValue::List(_) => "List",
            BencodeValue::Dictionary(_) => "Dict",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            BencodeValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BencodeValue::ByteString(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[BencodeValue]> {
        match self {
            BencodeValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            BencodeValue::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a dictionary.
    pub fn get(&self, key: &str) -> Option<&BencodeValue> {
        self.as_dict().and_then(|dict| dict.get(key.as_bytes()))
    }
}

impl fmt::Debug for BencodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BencodeValue::Integer(value) => write!(f, "{}", value),
            BencodeValue::ByteString(bytes) => write!(f, "{:?}", bytes.as_bstr()),
            BencodeValue::List(list) => f.debug_list().entries(list).finish(),
            BencodeValue::Dictionary(dict) => f
                .debug_map()
                .entries(dict.iter().map(|(key, value)| (key.as_bstr(), value)))
                .finish(),
        }
    }
}
