//! The host value model.
//!
//! Every `napi_value` an add-on sees resolves to one of these. Object-like
//! values carry `Rc` identity so wraps, references and strict equality
//! behave like the host language's object identity; primitives are plain
//! copies. All of this is host-thread-only by construction.

use indexmap::IndexMap;
use skellig_abi::{
    napi_callback, napi_property_attributes, napi_type_tag, napi_typedarray_type, napi_valuetype,
};
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::os::raw::c_void;
use std::rc::{Rc, Weak};

use crate::error::ExceptionKind;

pub type ObjectRef = Rc<RefCell<ObjectData>>;
pub type BufferRef = Rc<RefCell<BufferData>>;

#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(Rc<str>),
    Symbol(Rc<SymbolData>),
    Object(ObjectRef),
    External(Rc<ExternalData>),
    ArrayBuffer(BufferRef),
    TypedArray(Rc<TypedArrayData>),
    DataView(Rc<DataViewData>),
    Promise(Rc<RefCell<PromiseState>>),
    Date(f64),
}

#[derive(Debug)]
pub struct SymbolData {
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct ExternalData {
    pub data: *mut c_void,
}

/// Backing storage of an ArrayBuffer.
#[derive(Debug)]
pub enum BufferStorage {
    Owned(Vec<u8>),
    External { data: *mut u8, len: usize },
    Detached,
}

#[derive(Debug)]
pub struct BufferData {
    pub storage: BufferStorage,
}

impl BufferData {
    #[must_use]
    pub fn owned(bytes: Vec<u8>) -> BufferRef {
        Rc::new(RefCell::new(Self {
            storage: BufferStorage::Owned(bytes),
        }))
    }

    #[must_use]
    pub fn external(data: *mut u8, len: usize) -> BufferRef {
        Rc::new(RefCell::new(Self {
            storage: BufferStorage::External { data, len },
        }))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            BufferStorage::Owned(v) => v.len(),
            BufferStorage::External { len, .. } => *len,
            BufferStorage::Detached => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        matches!(self.storage, BufferStorage::Detached)
    }

    /// Raw pointer to the first byte. Null for detached or zero-length
    /// owned buffers that never allocated.
    #[must_use]
    pub fn as_ptr(&mut self) -> *mut u8 {
        match &mut self.storage {
            BufferStorage::Owned(v) => v.as_mut_ptr(),
            BufferStorage::External { data, .. } => *data,
            BufferStorage::Detached => std::ptr::null_mut(),
        }
    }
}

#[derive(Debug)]
pub struct TypedArrayData {
    pub kind: napi_typedarray_type,
    pub buffer: BufferRef,
    pub byte_offset: usize,
    /// Element count, not byte count.
    pub length: usize,
    /// Set for views created through the node Buffer entry points.
    pub node_buffer: bool,
}

impl TypedArrayData {
    #[must_use]
    pub fn element_size(kind: napi_typedarray_type) -> usize {
        use skellig_abi as abi;
        match kind {
            abi::napi_int8_array | abi::napi_uint8_array | abi::napi_uint8_clamped_array => 1,
            abi::napi_int16_array | abi::napi_uint16_array => 2,
            abi::napi_int32_array | abi::napi_uint32_array | abi::napi_float32_array => 4,
            _ => 8,
        }
    }
}

#[derive(Debug)]
pub struct DataViewData {
    pub buffer: BufferRef,
    pub byte_offset: usize,
    pub byte_length: usize,
}

#[derive(Clone, Debug)]
pub enum PromiseState {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

/// Key of an object property: strings compare by content, symbols by
/// identity.
#[derive(Clone, Debug)]
pub enum PropertyKey {
    Str(Rc<str>),
    Sym(Rc<SymbolData>),
}

impl PropertyKey {
    #[must_use]
    pub fn str(s: &str) -> Self {
        Self::Str(Rc::from(s))
    }
}

impl PartialEq for PropertyKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Sym(a), Self::Sym(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for PropertyKey {}

impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Str(s) => {
                state.write_u8(0);
                s.hash(state);
            }
            Self::Sym(s) => {
                state.write_u8(1);
                (Rc::as_ptr(s) as usize).hash(state);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum PropertySlot {
    Value(Value),
    Accessor {
        getter: Option<Value>,
        setter: Option<Value>,
    },
}

#[derive(Clone, Debug)]
pub struct Property {
    pub slot: PropertySlot,
    pub attributes: napi_property_attributes,
}

impl Property {
    #[must_use]
    pub fn enumerable(&self) -> bool {
        self.attributes & skellig_abi::napi_enumerable != 0
    }

    #[must_use]
    pub fn writable(&self) -> bool {
        self.attributes & skellig_abi::napi_writable != 0
    }

    #[must_use]
    pub fn configurable(&self) -> bool {
        self.attributes & skellig_abi::napi_configurable != 0
    }
}

/// Native-callable payload of a function object.
#[derive(Debug)]
pub struct CallableData {
    pub name: String,
    pub callback: napi_callback,
    pub data: *mut c_void,
    /// Present on constructors made by `napi_define_class`: the object
    /// instance method descriptors were attached to.
    pub class_prototype: Option<ObjectRef>,
}

/// Objects, arrays, errors and functions share this record; the optional
/// parts mark the flavor.
#[derive(Debug)]
pub struct ObjectData {
    pub props: IndexMap<PropertyKey, Property>,
    /// Present iff the object is an array.
    pub elements: Option<Vec<Value>>,
    /// Present iff the object is an error object.
    pub error_kind: Option<ExceptionKind>,
    /// Present iff the object is callable.
    pub callable: Option<CallableData>,
    /// Instance method lookup chain set up by `napi_define_class`.
    pub proto: Option<ObjectRef>,
    /// Native pointer attached by `napi_wrap`.
    pub wrap: Option<*mut c_void>,
    pub type_tag: Option<napi_type_tag>,
    pub frozen: bool,
    pub sealed: bool,
}

impl ObjectData {
    #[must_use]
    pub fn new() -> ObjectRef {
        Rc::new(RefCell::new(Self {
            props: IndexMap::new(),
            elements: None,
            error_kind: None,
            callable: None,
            proto: None,
            wrap: None,
            type_tag: None,
            frozen: false,
            sealed: false,
        }))
    }

    #[must_use]
    pub fn new_array(len: usize) -> ObjectRef {
        let obj = Self::new();
        obj.borrow_mut().elements = Some(vec![Value::Undefined; len]);
        obj
    }

    #[must_use]
    pub fn new_function(callable: CallableData) -> ObjectRef {
        let obj = Self::new();
        obj.borrow_mut().callable = Some(callable);
        obj
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.elements.is_some()
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        self.callable.is_some()
    }
}

/// A weak observer of an object-like value, used by weak references and
/// finalizer records. Primitives are held immediately: they have value
/// semantics and are never collected.
#[derive(Clone)]
pub enum WeakValue {
    Immediate(Value),
    Object(Weak<RefCell<ObjectData>>),
    Symbol(Weak<SymbolData>),
    External(Weak<ExternalData>),
    ArrayBuffer(Weak<RefCell<BufferData>>),
    TypedArray(Weak<TypedArrayData>),
    DataView(Weak<DataViewData>),
    Promise(Weak<RefCell<PromiseState>>),
    Str(Weak<str>),
}

impl WeakValue {
    pub fn upgrade(&self) -> Option<Value> {
        match self {
            Self::Immediate(v) => Some(v.clone()),
            Self::Object(w) => w.upgrade().map(Value::Object),
            Self::Symbol(w) => w.upgrade().map(Value::Symbol),
            Self::External(w) => w.upgrade().map(Value::External),
            Self::ArrayBuffer(w) => w.upgrade().map(Value::ArrayBuffer),
            Self::TypedArray(w) => w.upgrade().map(Value::TypedArray),
            Self::DataView(w) => w.upgrade().map(Value::DataView),
            Self::Promise(w) => w.upgrade().map(Value::Promise),
            Self::Str(w) => w.upgrade().map(Value::String),
        }
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.upgrade().is_none()
    }
}

impl Value {
    #[must_use]
    pub fn downgrade(&self) -> WeakValue {
        match self {
            Self::Object(r) => WeakValue::Object(Rc::downgrade(r)),
            Self::Symbol(r) => WeakValue::Symbol(Rc::downgrade(r)),
            Self::External(r) => WeakValue::External(Rc::downgrade(r)),
            Self::ArrayBuffer(r) => WeakValue::ArrayBuffer(Rc::downgrade(r)),
            Self::TypedArray(r) => WeakValue::TypedArray(Rc::downgrade(r)),
            Self::DataView(r) => WeakValue::DataView(Rc::downgrade(r)),
            Self::Promise(r) => WeakValue::Promise(Rc::downgrade(r)),
            Self::String(r) => WeakValue::Str(Rc::downgrade(r)),
            other => WeakValue::Immediate(other.clone()),
        }
    }

    #[must_use]
    pub fn type_of(&self) -> napi_valuetype {
        use skellig_abi as abi;
        match self {
            Self::Undefined => abi::napi_undefined,
            Self::Null => abi::napi_null,
            Self::Bool(_) => abi::napi_boolean,
            Self::Number(_) | Self::Date(_) => abi::napi_number,
            Self::BigInt(_) => abi::napi_bigint,
            Self::String(_) => abi::napi_string,
            Self::Symbol(_) => abi::napi_symbol,
            Self::Object(o) => {
                if o.borrow().is_function() {
                    abi::napi_function
                } else {
                    abi::napi_object
                }
            }
            Self::External(_) => abi::napi_external,
            Self::ArrayBuffer(_) | Self::TypedArray(_) | Self::DataView(_) | Self::Promise(_) => {
                abi::napi_object
            }
        }
    }

    /// Identity comparison in the host language's `===` sense. `Date` is
    /// held as a bare millisecond double, so two dates compare by value;
    /// this is part of the documented Date approximation.
    #[must_use]
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::External(a), Self::External(b)) => Rc::ptr_eq(a, b),
            (Self::ArrayBuffer(a), Self::ArrayBuffer(b)) => Rc::ptr_eq(a, b),
            (Self::TypedArray(a), Self::TypedArray(b)) => Rc::ptr_eq(a, b),
            (Self::DataView(a), Self::DataView(b)) => Rc::ptr_eq(a, b),
            (Self::Promise(a), Self::Promise(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::BigInt(n) => *n != 0,
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Object in the loose sense of `napi_object_expected` checks:
    /// anything with identity that can carry properties or wraps.
    #[must_use]
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Self::Object(_)
                | Self::ArrayBuffer(_)
                | Self::TypedArray(_)
                | Self::DataView(_)
                | Self::Promise(_)
        )
    }

    #[must_use]
    pub fn object() -> Self {
        Self::Object(ObjectData::new())
    }

    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String(Rc::from(s))
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) | Self::Date(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// String conversion in the host language's template-literal sense.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) | Self::Date(n) => number_to_display(*n),
            Self::BigInt(n) => n.to_string(),
            Self::String(s) => s.to_string(),
            Self::Symbol(s) => match &s.description {
                Some(d) => format!("Symbol({d})"),
                None => "Symbol()".to_string(),
            },
            Self::Object(o) => {
                let data = o.borrow();
                if let Some(callable) = &data.callable {
                    format!("function {}() {{ [native code] }}", callable.name)
                } else {
                    "[object Object]".to_string()
                }
            }
            Self::External(_) => "[object External]".to_string(),
            Self::ArrayBuffer(_) => "[object ArrayBuffer]".to_string(),
            Self::TypedArray(_) | Self::DataView(_) => "[object Object]".to_string(),
            Self::Promise(_) => "[object Promise]".to_string(),
        }
    }
}

/// Number formatting in the host language's sense: integral doubles print
/// without a fraction.
#[must_use]
pub fn number_to_display(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
