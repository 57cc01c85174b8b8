//! Byte-level builders for synthesizing kernel components in tests.

#![allow(dead_code)]

use dill_parser::component::MAGIC;
use dill_parser::ir::tag;
use dill_parser::{ByteWindow, DecodeOptions, FormatVersion, Session, SessionBuilder, StringTable};

#[derive(Default, Clone)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Bytes::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn byte(&mut self, value: u8) -> &mut Self {
        self.0.push(value);
        self
    }

    pub fn bytes(&mut self, values: &[u8]) -> &mut Self {
        self.0.extend_from_slice(values);
        self
    }

    /// Three-tier variable-length unsigned integer.
    pub fn uint(&mut self, value: u32) -> &mut Self {
        if value < 0x80 {
            self.byte(value as u8)
        } else if value < 0x4000 {
            self.bytes(&[0x80 | (value >> 8) as u8, value as u8])
        } else {
            assert!(value < 1 << 30, "{value} does not fit a UInt");
            self.bytes(&[
                0xC0 | (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            ])
        }
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub fn byte_list(&mut self, values: &[u8]) -> &mut Self {
        self.uint(values.len() as u32).bytes(values)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

// =================================================================
// Nodes
// =================================================================

/// `FunctionNode` with no parameters, a `dynamic` return type and an empty
/// block body.
pub fn empty_function(b: &mut Bytes) {
    b.byte(tag::FUNCTION_NODE)
        .uint(0) // file offset
        .uint(0) // file end offset
        .byte(0) // async marker
        .byte(0) // dart async marker
        .uint(0) // type parameters
        .uint(0) // parameter count
        .uint(0) // required parameter count
        .uint(0) // positional
        .uint(0) // named
        .byte(tag::DYNAMIC_TYPE)
        .byte(1)
        .byte(tag::BLOCK)
        .uint(0);
}

/// A public method procedure with an empty body.
pub fn procedure(canonical_name: u32, name: u32) -> Vec<u8> {
    let mut b = Bytes::new();
    b.byte(tag::PROCEDURE)
        .uint(canonical_name)
        .uint(0) // file uri
        .uint(0) // start file offset
        .uint(0) // file offset
        .uint(0) // file end offset
        .byte(0) // kind: method
        .byte(0) // flags
        .uint(name)
        .uint(0) // annotations
        .byte(0) // forwarding stub super target
        .byte(0); // forwarding stub interface target
    b.byte(1);
    empty_function(&mut b);
    b.into_inner()
}

/// A constructor whose initializer list holds one `assert(true)`.
pub fn constructor_with_assert(canonical_name: u32, name: u32, synthetic_byte: bool) -> Vec<u8> {
    let mut b = Bytes::new();
    b.byte(tag::CONSTRUCTOR)
        .uint(canonical_name)
        .uint(0) // file uri
        .uint(0) // start file offset
        .uint(0) // file offset
        .uint(0) // file end offset
        .byte(0) // flags
        .uint(name)
        .uint(0); // annotations
    empty_function(&mut b);
    b.uint(1).byte(tag::ASSERT_INITIALIZER);
    if synthetic_byte {
        b.byte(1);
    }
    b.byte(tag::ASSERT_STATEMENT)
        .byte(tag::TRUE_LITERAL)
        .uint(0) // condition start
        .uint(0) // condition end
        .byte(0); // message
    b.into_inner()
}

#[derive(Default, Clone)]
pub struct ClassBuilder {
    pub canonical_name: u32,
    pub name: u32,
    pub constructors: Vec<Vec<u8>>,
    pub procedures: Vec<Vec<u8>>,
    /// Procedure count written in the trailing class index, if any.
    pub index_count: Option<u32>,
}

impl ClassBuilder {
    pub fn encode(&self, base: u32) -> Vec<u8> {
        let mut b = Bytes::new();
        b.byte(tag::CLASS)
            .uint(self.canonical_name)
            .uint(0) // file uri
            .uint(0) // start file offset
            .uint(0) // file offset
            .uint(0) // file end offset
            .byte(3) // flags: body level
            .uint(self.name)
            .uint(0) // annotations
            .uint(0) // type parameters
            .byte(0) // super class
            .byte(0) // mixed-in type
            .uint(0) // implemented classes
            .uint(0); // fields
        b.uint(self.constructors.len() as u32);
        for constructor in &self.constructors {
            b.bytes(constructor);
        }
        b.uint(self.procedures.len() as u32);
        let mut offsets = Vec::new();
        for procedure in &self.procedures {
            offsets.push(base + b.len() as u32);
            b.bytes(procedure);
        }
        offsets.push(base + b.len() as u32);
        b.uint(0); // redirecting factory constructors

        if let Some(count) = self.index_count {
            for offset in offsets.iter().take(count as usize + 1) {
                b.u32(*offset);
            }
            for _ in offsets.len()..count as usize + 1 {
                b.u32(0);
            }
            b.u32(count);
        }
        b.into_inner()
    }
}

#[derive(Default, Clone)]
pub struct LibraryBuilder {
    pub canonical_name: u32,
    pub name: u32,
    pub classes: Vec<ClassBuilder>,
    pub procedures: Vec<Vec<u8>>,
}

impl LibraryBuilder {
    /// Encodes the library as if it started at absolute offset `base`.
    pub fn encode(&self, base: u32) -> Vec<u8> {
        let mut b = Bytes::new();
        b.byte(0) // flags
            .uint(self.canonical_name)
            .uint(self.name)
            .uint(0) // file uri
            .uint(0) // annotations
            .uint(0) // dependencies
            .uint(0) // additional exports
            .uint(0) // parts
            .uint(0); // typedefs

        let mut class_offsets = Vec::new();
        for class in &self.classes {
            let start = base + b.len() as u32;
            class_offsets.push(start);
            b.bytes(&class.encode(start));
        }
        class_offsets.push(base + b.len() as u32);
        b.uint(0); // fields

        let mut procedure_offsets = Vec::new();
        for procedure in &self.procedures {
            procedure_offsets.push(base + b.len() as u32);
            b.bytes(procedure);
        }
        procedure_offsets.push(base + b.len() as u32);

        for offset in &class_offsets {
            b.u32(*offset);
        }
        b.u32(self.classes.len() as u32);
        for offset in &procedure_offsets {
            b.u32(*offset);
        }
        b.u32(self.procedures.len() as u32);
        b.into_inner()
    }
}

// =================================================================
// Components
// =================================================================

pub struct ComponentBuilder {
    pub magic: u32,
    pub version: u32,
    pub problems: Vec<String>,
    pub strings: Vec<String>,
    /// `(parent, name)` pairs, both biased.
    pub names: Vec<(u32, u32)>,
    pub libraries: Vec<LibraryBuilder>,
    pub constants: Vec<Vec<u8>>,
    pub metadata_payloads: Vec<u8>,
    /// `(tag, [(node offset, metadata offset)])` in file order.
    pub metadata_mappings: Vec<(u32, Vec<(u32, u32)>)>,
    /// `(uri, line starts)` per source.
    pub sources: Vec<(String, Vec<u32>)>,
    pub main_method: u32,
}

impl Default for ComponentBuilder {
    fn default() -> Self {
        ComponentBuilder {
            magic: MAGIC,
            version: FormatVersion::BASELINE.0,
            problems: Vec::new(),
            strings: Vec::new(),
            names: Vec::new(),
            libraries: Vec::new(),
            constants: Vec::new(),
            metadata_payloads: Vec::new(),
            metadata_mappings: Vec::new(),
            sources: Vec::new(),
            main_method: 0,
        }
    }
}

impl ComponentBuilder {
    /// Interns `text`, returning its biased reference.
    pub fn string(&mut self, text: &str) -> u32 {
        let slot = match self.strings.iter().position(|s| s == text) {
            Some(slot) => slot,
            None => {
                self.strings.push(text.to_owned());
                self.strings.len() - 1
            }
        };
        slot as u32 + 1
    }

    /// Adds a canonical name under `parent`, returning its biased reference.
    pub fn name(&mut self, parent: u32, segment: &str) -> u32 {
        let segment = self.string(segment);
        self.names.push((parent, segment));
        self.names.len() as u32
    }

    pub fn build(&self) -> Vec<u8> {
        let mut b = Bytes::new();
        b.u32(self.magic).u32(self.version);
        if self.version >= 17 {
            b.uint(self.problems.len() as u32);
            for problem in &self.problems {
                b.byte_list(problem.as_bytes());
            }
        }

        let mut library_offsets = Vec::new();
        for library in &self.libraries {
            let start = b.len() as u32;
            library_offsets.push(start);
            b.bytes(&library.encode(start));
        }
        library_offsets.push(b.len() as u32);

        let source_table = b.len() as u32;
        b.u32(self.sources.len() as u32);
        let mut source_offsets = Vec::new();
        for (uri, line_starts) in &self.sources {
            source_offsets.push(b.len() as u32);
            b.byte_list(uri.as_bytes()).byte_list(&[]);
            b.uint(line_starts.len() as u32);
            let mut previous = 0;
            for start in line_starts {
                b.uint(start - previous);
                previous = *start;
            }
        }
        for offset in source_offsets {
            b.u32(offset);
        }

        let canonical_names = b.len() as u32;
        b.uint(self.names.len() as u32);
        for (parent, name) in &self.names {
            b.uint(*parent).uint(*name);
        }

        let metadata_payloads = b.len() as u32;
        b.bytes(&self.metadata_payloads);

        let metadata_mappings = b.len() as u32;
        for (tag, entries) in &self.metadata_mappings {
            b.u32(*tag);
            for (node, metadata) in entries {
                b.u32(*node).u32(*metadata);
            }
            b.u32(entries.len() as u32);
        }
        b.u32(self.metadata_mappings.len() as u32);

        let string_table = b.len() as u32;
        encode_strings(&mut b, &self.strings);

        let constant_table = b.len() as u32;
        b.uint(self.constants.len() as u32);
        for constant in &self.constants {
            b.bytes(constant);
        }

        let library_count = self.libraries.len() as u32;
        let file_size = b.len() as u32 + (library_count + 10) * 4;
        b.u32(source_table)
            .u32(canonical_names)
            .u32(metadata_payloads)
            .u32(metadata_mappings)
            .u32(string_table)
            .u32(constant_table)
            .u32(self.main_method);
        for offset in &library_offsets {
            b.u32(*offset);
        }
        b.u32(library_count).u32(file_size);
        assert_eq!(b.len() as u32, file_size);
        b.into_inner()
    }
}

pub fn encode_strings(b: &mut Bytes, strings: &[String]) {
    b.uint(strings.len() as u32 + 1).uint(0);
    let mut end = 0;
    for s in strings {
        end += s.len() as u32;
        b.uint(end);
    }
    for s in strings {
        b.bytes(s.as_bytes());
    }
}

/// A session over `strings` with no canonical names.
pub fn session(strings: &[&str], options: DecodeOptions) -> Session {
    let mut b = Bytes::new();
    let owned: Vec<String> = strings.iter().map(|s| s.to_string()).collect();
    encode_strings(&mut b, &owned);
    let table = StringTable::read(&mut ByteWindow::new(b.into_inner())).unwrap();
    let mut builder = SessionBuilder::new(FormatVersion::BASELINE, options);
    builder.attach_strings(table).unwrap();
    builder.build().unwrap()
}

/// One library with one top-level `main` procedure and nothing else.
pub fn minimal_component() -> ComponentBuilder {
    let mut c = ComponentBuilder::default();
    let library = c.name(0, "package:app/main.dart");
    let main = c.name(library, "main");
    let main_text = c.string("main");
    let library_name = c.string("app");
    c.main_method = main;
    c.libraries.push(LibraryBuilder {
        canonical_name: library,
        name: library_name,
        classes: Vec::new(),
        procedures: vec![procedure(main, main_text)],
    });
    c
}
