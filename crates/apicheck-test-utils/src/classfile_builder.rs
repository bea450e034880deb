use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

const ACC_PUBLIC: u16 = 0x0001;
const ACC_SUPER: u16 = 0x0020;

/// Builds a class file containing just the declarations (no code attributes).
///
/// Names are internal names (`com/example/Foo`), descriptors and signatures use the
/// class-file grammar verbatim.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    this_class: String,
    access_flags: u16,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<MemberBuilder>,
    methods: Vec<MemberBuilder>,
    inner_classes: Vec<InnerClassEntry>,
}

#[derive(Debug, Clone)]
pub struct MemberBuilder {
    access_flags: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    synthetic_attribute: bool,
}

#[derive(Debug, Clone)]
struct InnerClassEntry {
    inner: String,
    outer: Option<String>,
    name: Option<String>,
    access_flags: u16,
}

impl MemberBuilder {
    pub fn new(access_flags: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            synthetic_attribute: false,
        }
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    /// Emits a legacy `Synthetic` attribute instead of relying on `ACC_SYNTHETIC`.
    pub fn synthetic_attribute(mut self) -> Self {
        self.synthetic_attribute = true;
        self
    }
}

impl ClassFileBuilder {
    /// A `public class` extending `java/lang/Object`.
    pub fn new(internal_name: &str) -> Self {
        Self {
            this_class: internal_name.to_string(),
            access_flags: ACC_PUBLIC | ACC_SUPER,
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    pub fn internal_name(&self) -> &str {
        &self.this_class
    }

    pub fn access(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn super_class(mut self, super_class: Option<&str>) -> Self {
        self.super_class = super_class.map(str::to_string);
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn field(mut self, field: MemberBuilder) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MemberBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// The public no-arg constructor javac would emit for a class without constructors.
    pub fn default_constructor(self) -> Self {
        self.method(MemberBuilder::new(ACC_PUBLIC, "<init>", "()V"))
    }

    pub fn inner_class(
        mut self,
        inner: &str,
        outer: Option<&str>,
        simple_name: Option<&str>,
        access_flags: u16,
    ) -> Self {
        self.inner_classes.push(InnerClassEntry {
            inner: inner.to_string(),
            outer: outer.map(str::to_string),
            name: simple_name.map(str::to_string),
            access_flags,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolBuilder::default();

        let this_class = pool.class(&self.this_class);
        let super_class = self.super_class.as_deref().map_or(0, |s| pool.class(s));
        let interfaces: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();
        let fields: Vec<Vec<u8>> = self.fields.iter().map(|m| member(&mut pool, m)).collect();
        let methods: Vec<Vec<u8>> = self.methods.iter().map(|m| member(&mut pool, m)).collect();

        let mut class_attrs: Vec<Vec<u8>> = Vec::new();
        if let Some(sig) = &self.signature {
            class_attrs.push(signature_attribute(&mut pool, sig));
        }
        if !self.inner_classes.is_empty() {
            let mut info = Vec::new();
            put_u2(&mut info, self.inner_classes.len() as u16);
            for entry in &self.inner_classes {
                put_u2(&mut info, pool.class(&entry.inner));
                put_u2(&mut info, entry.outer.as_deref().map_or(0, |o| pool.class(o)));
                put_u2(&mut info, entry.name.as_deref().map_or(0, |n| pool.utf8(n)));
                put_u2(&mut info, entry.access_flags);
            }
            class_attrs.push(attribute(&mut pool, "InnerClasses", &info));
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        put_u2(&mut out, 0); // minor
        put_u2(&mut out, 61); // Java 17
        pool.write(&mut out);
        put_u2(&mut out, self.access_flags);
        put_u2(&mut out, this_class);
        put_u2(&mut out, super_class);
        put_u2(&mut out, interfaces.len() as u16);
        for i in interfaces {
            put_u2(&mut out, i);
        }
        put_u2(&mut out, fields.len() as u16);
        for f in fields {
            out.extend_from_slice(&f);
        }
        put_u2(&mut out, methods.len() as u16);
        for m in methods {
            out.extend_from_slice(&m);
        }
        put_u2(&mut out, class_attrs.len() as u16);
        for a in class_attrs {
            out.extend_from_slice(&a);
        }
        out
    }

    /// Writes `<root>/<internal name>.class`, creating package directories.
    pub fn write_to(&self, root: &Path) -> io::Result<PathBuf> {
        let path = root.join(format!("{}.class", self.this_class));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.build())?;
        Ok(path)
    }
}

fn member(pool: &mut PoolBuilder, m: &MemberBuilder) -> Vec<u8> {
    let mut attrs = Vec::new();
    if let Some(sig) = &m.signature {
        attrs.push(signature_attribute(pool, sig));
    }
    if m.synthetic_attribute {
        attrs.push(attribute(pool, "Synthetic", &[]));
    }

    let mut out = Vec::new();
    put_u2(&mut out, m.access_flags);
    put_u2(&mut out, pool.utf8(&m.name));
    put_u2(&mut out, pool.utf8(&m.descriptor));
    put_u2(&mut out, attrs.len() as u16);
    for a in attrs {
        out.extend_from_slice(&a);
    }
    out
}

fn signature_attribute(pool: &mut PoolBuilder, signature: &str) -> Vec<u8> {
    let index = pool.utf8(signature);
    attribute(pool, "Signature", &index.to_be_bytes())
}

fn attribute(pool: &mut PoolBuilder, name: &str, info: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_u2(&mut out, pool.utf8(name));
    out.extend_from_slice(&(info.len() as u32).to_be_bytes());
    out.extend_from_slice(info);
    out
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[derive(Default)]
struct PoolBuilder {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl PoolBuilder {
    fn next_index(&mut self) -> u16 {
        self.count += 1;
        self.count
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8.get(value) {
            return index;
        }
        let index = self.next_index();
        self.bytes.push(1);
        put_u2(&mut self.bytes, value.len() as u16);
        self.bytes.extend_from_slice(value.as_bytes());
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(&index) = self.classes.get(internal_name) {
            return index;
        }
        let name_index = self.utf8(internal_name);
        let index = self.next_index();
        self.bytes.push(7);
        put_u2(&mut self.bytes, name_index);
        self.classes.insert(internal_name.to_string(), index);
        index
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u2(out, self.count + 1);
        out.extend_from_slice(&self.bytes);
    }
}
