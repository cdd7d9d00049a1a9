//! Heap-resident object model for structured values.
//!
//! A structured value is either a scalar or a handle to a [`Container`]
//! stored in an [`ObjectHeap`]. Containers come in two kinds:
//!
//! - **Keyed**: named attributes, iterated in insertion order.
//! - **Indexed**: possibly sparse integer-indexed attributes with a derived
//!   `length` (max occupied index + 1) that is never stored.
//!
//! Every attribute is either a data attribute or an accessor pair and carries
//! `enumerable`/`configurable` (and, for data, `writable`) metadata. A
//! container may delegate unresolved reads to a prototype container; the
//! delegating freeze is built on that back-reference.
//!
//! Callables are host closures registered on the heap and referenced by
//! [`FunctionId`]. They are compared by identity and never cloned.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AlgebraResult, StructError};

/// Serialize/deserialize `IndexMap<PropertyKey, Attribute>` as an ordered
/// sequence of `[key, attribute]` pairs. JSON maps need string keys but
/// `PropertyKey` is an enum, and the pair form keeps insertion order.
mod attributes_as_seq {
    use super::{Attribute, IndexMap, PropertyKey};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        map: &IndexMap<PropertyKey, Attribute>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&PropertyKey, &Attribute)> = map.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<PropertyKey, Attribute>, D::Error> {
        let pairs: Vec<(PropertyKey, Attribute)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// Name of the derived length pseudo-attribute of indexed containers.
pub const LENGTH_NAME: &str = "length";

/// Maximum delegation chain depth walked by property reads.
const MAX_PROTOTYPE_CHAIN_DEPTH: u32 = 1024;

// ---------------------------------------------------------------------------
// PropertyKey
// ---------------------------------------------------------------------------

/// An attribute key: an integer index or a name.
///
/// The derived `Ord` sorts every index before every name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyKey {
    Index(u32),
    Name(String),
}

impl PropertyKey {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Name(_) => None,
        }
    }

    /// Is this the `length` pseudo-attribute name?
    pub fn is_length(&self) -> bool {
        self.as_name() == Some(LENGTH_NAME)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// The index a name denotes when it is the canonical decimal form of an
/// array index (`0..=u32::MAX - 1`). `"01"`, `"-1"` and `"+1"` stay names.
fn canonical_index(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

// Numeric names share one key space with indices, so `{"0": x}` and `[x]`
// address the same attribute.
impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        match canonical_index(s) {
            Some(index) => Self::Index(index),
            None => Self::Name(s.to_string()),
        }
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        match canonical_index(&s) {
            Some(index) => Self::Index(index),
            None => Self::Name(s),
        }
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque handle referencing a container on the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u32);

/// Opaque handle referencing a registered host function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A structured value: a scalar, a callable reference, or a container handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Function(FunctionId),
    Object(ObjectHandle),
}

impl Value {
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            Self::Object(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::Str(_) => "string",
            Self::Function(_) => "function",
            Self::Object(_) => "object",
        }
    }

    /// Strict equality: numbers compare numerically across `Int`/`Float`,
    /// `NaN` is never equal, callables and containers compare by identity.
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => *i as f64 == *f,
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Function(id) => write!(f, "[function#{}]", id.0),
            Self::Object(h) => write!(f, "[object#{}]", h.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// An own entry of a container: a data slot or an accessor pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<FunctionId>,
        set: Option<FunctionId>,
        enumerable: bool,
        configurable: bool,
    },
}

impl Attribute {
    /// Writable, enumerable, configurable data attribute.
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Enumerable, configurable accessor attribute.
    pub fn accessor(get: Option<FunctionId>, set: Option<FunctionId>) -> Self {
        Self::Accessor {
            get,
            set,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// The stored value, if this is a data attribute.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Replace the stored value; no-op for accessors.
    pub fn set_value(&mut self, new_value: Value) {
        if let Self::Data { value, .. } = self {
            *value = new_value;
        }
    }

    /// Data attribute with writable=true? Accessors are never writable.
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { writable, .. } => *writable,
            Self::Accessor { .. } => false,
        }
    }

    pub fn getter(&self) -> Option<FunctionId> {
        match self {
            Self::Accessor { get, .. } => *get,
            Self::Data { .. } => None,
        }
    }

    pub fn setter(&self) -> Option<FunctionId> {
        match self {
            Self::Accessor { set, .. } => *set,
            Self::Data { .. } => None,
        }
    }

    /// Drop the setter of an accessor; no-op for data attributes.
    pub fn strip_setter(&mut self) {
        if let Self::Accessor { set, .. } = self {
            *set = None;
        }
    }

    pub fn set_non_configurable(&mut self) {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => {
                *configurable = false;
            }
        }
    }

    /// Make this data attribute non-writable (no-op for accessors).
    pub fn set_non_writable(&mut self) {
        if let Self::Data { writable, .. } = self {
            *writable = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// The two structural shapes a container can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Keyed,
    Indexed,
}

impl ContainerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyed => "keyed",
            Self::Indexed => "indexed",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyed record or indexed sequence with ES-style attribute metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    /// Fixed at allocation.
    pub kind: ContainerKind,
    /// Delegation back-reference consulted for keys this container lacks.
    pub prototype: Option<ObjectHandle>,
    /// New attributes may be added only while extensible.
    pub extensible: bool,
    #[serde(with = "attributes_as_seq")]
    attributes: IndexMap<PropertyKey, Attribute>,
}

impl Container {
    pub fn new(kind: ContainerKind) -> Self {
        Self::with_prototype(kind, None)
    }

    pub fn with_prototype(kind: ContainerKind, prototype: Option<ObjectHandle>) -> Self {
        Self {
            kind,
            prototype,
            extensible: true,
            attributes: IndexMap::new(),
        }
    }

    pub fn get_own_attribute(&self, key: &PropertyKey) -> Option<&Attribute> {
        self.attributes.get(key)
    }

    pub fn has_own_attribute(&self, key: &PropertyKey) -> bool {
        self.attributes.contains_key(key)
    }

    /// Number of own attributes (the derived `length` is not one of them).
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of own attributes that show up in enumeration.
    pub fn enumerable_count(&self) -> usize {
        self.attributes
            .values()
            .filter(|attr| attr.is_enumerable())
            .count()
    }

    /// Define or update an attribute.
    ///
    /// Returns `false` when the change is rejected: a new key on a
    /// non-extensible container, or an incompatible change to a
    /// non-configurable attribute.
    pub fn define_own_attribute(&mut self, key: PropertyKey, attr: Attribute) -> bool {
        if let Some(current) = self.attributes.get(&key) {
            if !current.is_configurable() {
                if attr.is_configurable() {
                    return false;
                }
                if attr.is_enumerable() != current.is_enumerable() {
                    return false;
                }
                if current.is_data() != attr.is_data() {
                    return false;
                }
                if let (
                    Attribute::Data {
                        writable: current_w,
                        value: current_v,
                        ..
                    },
                    Attribute::Data {
                        writable: new_w,
                        value: new_v,
                        ..
                    },
                ) = (current, &attr)
                    && !current_w
                    && (*new_w || !current_v.strict_equals(new_v))
                {
                    return false;
                }
                if current.is_accessor()
                    && (current.getter() != attr.getter() || current.setter() != attr.setter())
                {
                    return false;
                }
            }
            self.attributes.insert(key, attr);
            true
        } else {
            if !self.extensible {
                return false;
            }
            self.attributes.insert(key, attr);
            true
        }
    }

    /// Unchecked insert used while building fresh results. Overwrites any
    /// existing entry in place, keeping its iteration position.
    pub(crate) fn put(&mut self, key: PropertyKey, attr: Attribute) {
        self.attributes.insert(key, attr);
    }

    /// Remove an attribute. Returns `false` if it is non-configurable.
    pub fn delete(&mut self, key: &PropertyKey) -> bool {
        match self.attributes.get(key) {
            Some(attr) if !attr.is_configurable() => false,
            Some(_) => {
                self.attributes.shift_remove(key);
                true
            }
            None => true,
        }
    }

    /// Own keys: indices ascending, then names in insertion order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<u32> = self
            .attributes
            .keys()
            .filter_map(PropertyKey::as_index)
            .collect();
        indices.sort_unstable();

        let names = self
            .attributes
            .keys()
            .filter(|key| key.as_name().is_some())
            .cloned();
        indices
            .into_iter()
            .map(PropertyKey::Index)
            .chain(names)
            .collect()
    }

    /// One past the highest own index, or 0 when no index is occupied.
    pub fn own_length(&self) -> u64 {
        self.attributes
            .keys()
            .filter_map(PropertyKey::as_index)
            .map(|index| u64::from(index) + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// Make every attribute non-configurable, every data attribute
    /// non-writable, and the container non-extensible.
    pub fn freeze(&mut self) {
        self.extensible = false;
        for attr in self.attributes.values_mut() {
            attr.set_non_configurable();
            attr.set_non_writable();
        }
    }

    pub fn is_frozen(&self) -> bool {
        if self.extensible {
            return false;
        }
        self.attributes
            .values()
            .all(|attr| !attr.is_configurable() && !attr.is_writable())
    }
}

// ---------------------------------------------------------------------------
// Host functions
// ---------------------------------------------------------------------------

/// Host closure invoked with the heap, the receiver container and arguments.
pub type NativeFn = Rc<dyn Fn(&ObjectHeap, ObjectHandle, &[Value]) -> Value>;

#[derive(Clone)]
pub struct HostFunction {
    pub name: String,
    call: NativeFn,
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ObjectHeap
// ---------------------------------------------------------------------------

/// Arena of containers plus the registry of host functions.
///
/// Containers are never freed; results of every operation are appended.
/// Host functions are not part of a serialized snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectHeap {
    containers: Vec<Container>,
    #[serde(skip)]
    functions: Vec<HostFunction>,
}

impl ObjectHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of containers allocated.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn alloc(&mut self, kind: ContainerKind) -> ObjectHandle {
        self.insert(Container::new(kind))
    }

    pub fn alloc_with_prototype(
        &mut self,
        kind: ContainerKind,
        prototype: Option<ObjectHandle>,
    ) -> ObjectHandle {
        self.insert(Container::with_prototype(kind, prototype))
    }

    fn insert(&mut self, container: Container) -> ObjectHandle {
        let handle = ObjectHandle(self.containers.len() as u32);
        self.containers.push(container);
        handle
    }

    /// Allocate a keyed container with default data attributes.
    pub fn keyed<K, I>(&mut self, entries: I) -> ObjectHandle
    where
        K: Into<PropertyKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut container = Container::new(ContainerKind::Keyed);
        for (key, value) in entries {
            container.put(key.into(), Attribute::data(value));
        }
        self.insert(container)
    }

    /// Allocate a dense indexed container.
    pub fn indexed<I>(&mut self, values: I) -> ObjectHandle
    where
        I: IntoIterator<Item = Value>,
    {
        let mut container = Container::new(ContainerKind::Indexed);
        for (index, value) in values.into_iter().enumerate() {
            container.put(PropertyKey::Index(index as u32), Attribute::data(value));
        }
        self.insert(container)
    }

    /// Allocate an indexed container with holes at every unlisted index.
    pub fn indexed_sparse<I>(&mut self, entries: I) -> ObjectHandle
    where
        I: IntoIterator<Item = (u32, Value)>,
    {
        let mut container = Container::new(ContainerKind::Indexed);
        for (index, value) in entries {
            container.put(PropertyKey::Index(index), Attribute::data(value));
        }
        self.insert(container)
    }

    pub fn register_function<F>(&mut self, name: impl Into<String>, call: F) -> FunctionId
    where
        F: Fn(&ObjectHeap, ObjectHandle, &[Value]) -> Value + 'static,
    {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(HostFunction {
            name: name.into(),
            call: Rc::new(call),
        });
        id
    }

    pub fn function_name(&self, id: FunctionId) -> Option<&str> {
        self.functions
            .get(id.0 as usize)
            .map(|function| function.name.as_str())
    }

    pub fn call_function(
        &self,
        id: FunctionId,
        receiver: ObjectHandle,
        args: &[Value],
    ) -> AlgebraResult<Value> {
        let function = self.functions.get(id.0 as usize).ok_or_else(|| {
            StructError::invalid_argument(
                "call_function",
                format!("function#{} not registered", id.0),
            )
        })?;
        Ok((function.call)(self, receiver, args))
    }

    pub fn container(&self, handle: ObjectHandle) -> AlgebraResult<&Container> {
        self.containers
            .get(handle.0 as usize)
            .ok_or_else(|| StructError::unknown_handle(handle))
    }

    pub fn container_mut(&mut self, handle: ObjectHandle) -> AlgebraResult<&mut Container> {
        self.containers
            .get_mut(handle.0 as usize)
            .ok_or_else(|| StructError::unknown_handle(handle))
    }

    /// Kind of the container a value refers to, `None` for scalars and
    /// callables.
    pub fn kind_of(&self, value: &Value) -> Option<ContainerKind> {
        let handle = value.as_object()?;
        self.container(handle).ok().map(|container| container.kind)
    }

    pub fn own_attribute(
        &self,
        handle: ObjectHandle,
        key: &PropertyKey,
    ) -> AlgebraResult<Option<&Attribute>> {
        Ok(self.container(handle)?.get_own_attribute(key))
    }

    pub fn own_keys(&self, handle: ObjectHandle) -> AlgebraResult<Vec<PropertyKey>> {
        Ok(self.container(handle)?.own_keys())
    }

    /// Own attributes in own-key order, cloned out of the heap so callers can
    /// allocate while iterating.
    pub fn own_attributes(
        &self,
        handle: ObjectHandle,
    ) -> AlgebraResult<Vec<(PropertyKey, Attribute)>> {
        let container = self.container(handle)?;
        Ok(container
            .own_keys()
            .into_iter()
            .filter_map(|key| {
                let attr = container.get_own_attribute(&key)?.clone();
                Some((key, attr))
            })
            .collect())
    }

    /// The container followed by its delegation chain.
    fn delegation_chain(&self, handle: ObjectHandle) -> AlgebraResult<Vec<ObjectHandle>> {
        let mut chain = Vec::new();
        let mut visited = BTreeSet::new();
        let mut current = Some(handle);
        let mut depth: u32 = 0;

        while let Some(h) = current {
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(StructError::invalid_argument(
                    "delegation",
                    format!("prototype chain depth {depth} exceeds max {MAX_PROTOTYPE_CHAIN_DEPTH}"),
                ));
            }
            if !visited.insert(h) {
                return Err(StructError::invalid_argument(
                    "delegation",
                    "prototype chain cycle detected",
                ));
            }
            chain.push(h);
            current = self.container(h)?.prototype;
            depth += 1;
        }
        Ok(chain)
    }

    /// Derived length of an indexed container, including indices visible
    /// through delegation. `None` for keyed containers.
    pub fn length(&self, handle: ObjectHandle) -> AlgebraResult<Option<u64>> {
        if self.container(handle)?.kind != ContainerKind::Indexed {
            return Ok(None);
        }
        let mut length = 0;
        for h in self.delegation_chain(handle)? {
            length = length.max(self.container(h)?.own_length());
        }
        Ok(Some(length))
    }

    /// Read a key: own attribute first, then the delegation chain.
    ///
    /// Accessors invoke their getter with `handle` as receiver; a missing
    /// getter or a missing key reads as `Undefined`.
    pub fn get_property(&self, handle: ObjectHandle, key: &PropertyKey) -> AlgebraResult<Value> {
        if key.is_length()
            && let Some(length) = self.length(handle)?
        {
            return Ok(Value::Int(length as i64));
        }

        for h in self.delegation_chain(handle)? {
            if let Some(attr) = self.container(h)?.get_own_attribute(key) {
                return match attr {
                    Attribute::Data { value, .. } => Ok(value.clone()),
                    Attribute::Accessor { get: Some(getter), .. } => {
                        self.call_function(*getter, handle, &[])
                    }
                    Attribute::Accessor { get: None, .. } => Ok(Value::Undefined),
                };
            }
        }
        Ok(Value::Undefined)
    }

    /// Is `key` visible on the container or anywhere along its delegation
    /// chain?
    pub fn has_property(&self, handle: ObjectHandle, key: &PropertyKey) -> AlgebraResult<bool> {
        for h in self.delegation_chain(handle)? {
            if self.container(h)?.has_own_attribute(key) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Assign a value to an own key.
    ///
    /// Only the receiver's own attributes are consulted: a writable data
    /// attribute is updated, an accessor's setter is invoked, anything else
    /// (non-writable data, setter-less accessor, a new key on a
    /// non-extensible container) fails with `Immutable`.
    pub fn set_property(
        &mut self,
        handle: ObjectHandle,
        key: PropertyKey,
        value: Value,
    ) -> AlgebraResult<()> {
        let container = self.container(handle)?;
        if container.kind == ContainerKind::Indexed && key.is_length() {
            return Err(StructError::invalid_argument(
                "set_property",
                "length of an indexed container is derived",
            ));
        }
        let existing = container.get_own_attribute(&key).cloned();
        let extensible = container.extensible;

        match existing {
            Some(Attribute::Data { writable: true, .. }) => {
                if let Some(attr) = self.container_mut(handle)?.attributes.get_mut(&key) {
                    attr.set_value(value);
                }
                Ok(())
            }
            Some(Attribute::Accessor {
                set: Some(setter), ..
            }) => {
                self.call_function(setter, handle, &[value])?;
                Ok(())
            }
            Some(_) => Err(StructError::immutable(&key)),
            None if extensible => {
                self.container_mut(handle)?
                    .put(key, Attribute::data(value));
                Ok(())
            }
            None => Err(StructError::immutable(&key)),
        }
    }

    /// Define an attribute, enforcing configurability and extensibility.
    pub fn define_property(
        &mut self,
        handle: ObjectHandle,
        key: PropertyKey,
        attr: Attribute,
    ) -> AlgebraResult<()> {
        let container = self.container_mut(handle)?;
        if container.kind == ContainerKind::Indexed && key.is_length() {
            return Err(StructError::invalid_argument(
                "define_property",
                "length of an indexed container is derived",
            ));
        }
        if container.define_own_attribute(key.clone(), attr) {
            Ok(())
        } else {
            Err(StructError::immutable(&key))
        }
    }

    /// Delete an own attribute. `Ok(false)` when the key is absent.
    pub fn delete_property(&mut self, handle: ObjectHandle, key: &PropertyKey) -> AlgebraResult<bool> {
        let container = self.container_mut(handle)?;
        if !container.has_own_attribute(key) {
            return Ok(false);
        }
        if container.delete(key) {
            Ok(true)
        } else {
            Err(StructError::immutable(key))
        }
    }

    pub fn get_prototype_of(&self, handle: ObjectHandle) -> AlgebraResult<Option<ObjectHandle>> {
        Ok(self.container(handle)?.prototype)
    }

    pub fn is_extensible(&self, handle: ObjectHandle) -> AlgebraResult<bool> {
        Ok(self.container(handle)?.extensible)
    }

    pub fn prevent_extensions(&mut self, handle: ObjectHandle) -> AlgebraResult<()> {
        self.container_mut(handle)?.prevent_extensions();
        Ok(())
    }

    /// Shallow freeze of a single container.
    pub fn freeze(&mut self, handle: ObjectHandle) -> AlgebraResult<()> {
        self.container_mut(handle)?.freeze();
        Ok(())
    }

    pub fn is_frozen(&self, handle: ObjectHandle) -> AlgebraResult<bool> {
        Ok(self.container(handle)?.is_frozen())
    }

    /// Structural equality.
    ///
    /// Containers are equal when they have the same kind and the same own
    /// keys, data values are recursively equal and accessors share getter and
    /// setter. Attribute flags and delegation are not compared; `NaN` equals
    /// itself.
    pub fn deep_equals(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Object(x), Value::Object(y)) => self.containers_equal(*x, *y),
            (Value::Float(x), Value::Float(y)) if x.is_nan() && y.is_nan() => true,
            _ => a.strict_equals(b),
        }
    }

    fn containers_equal(&self, a: ObjectHandle, b: ObjectHandle) -> bool {
        if a == b {
            return true;
        }
        let (Ok(left), Ok(right)) = (self.container(a), self.container(b)) else {
            return false;
        };
        if left.kind != right.kind || left.attribute_count() != right.attribute_count() {
            return false;
        }
        left.attributes
            .iter()
            .all(|(key, attr)| match (attr, right.get_own_attribute(key)) {
                (Attribute::Data { value: lv, .. }, Some(Attribute::Data { value: rv, .. })) => {
                    self.deep_equals(lv, rv)
                }
                (Attribute::Accessor { .. }, Some(other @ Attribute::Accessor { .. })) => {
                    attr.getter() == other.getter() && attr.setter() == other.setter()
                }
                _ => false,
            })
    }
}
