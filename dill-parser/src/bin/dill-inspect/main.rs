//! CLI tool to decode a Dart kernel binary and summarize its contents.

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use dill_parser::ir::Procedure;
use dill_parser::{
    Class, ComponentFile, ComponentView, DecodeOptions, Library, NameResolver, SyntheticFlag,
};

mod compile;
use compile::compile_to_kernel;

#[derive(Parser, Debug)]
#[command(name = "dill-inspect")]
#[command(about = "Decode a Dart kernel binary and summarize its libraries")]
struct CLI {
    /// Kernel binary to decode, or Dart source when `--compile` is set.
    input: PathBuf,
    /// Compile the input with the Dart toolchain first.
    #[arg(short, long)]
    compile: bool,
    /// Toolchain executable used by `--compile`.
    #[arg(long, default_value = "dart")]
    dart: PathBuf,
    /// Print the summary as JSON.
    #[arg(short, long)]
    json: bool,
    /// Whether assert initializers carry an `isSynthetic` byte.
    #[arg(short, long, default_value = "auto")]
    assert_synthetic: SyntheticFlag,
    /// Decode only the library at this index.
    #[arg(short, long)]
    library: Option<usize>,
    /// Decode libraries on all cores.
    #[arg(short, long)]
    parallel: bool,
}

#[derive(Serialize, Debug)]
struct ComponentSummary {
    version: u32,
    problems: Vec<String>,
    main_method: Option<String>,
    strings: usize,
    canonical_names: usize,
    constants: usize,
    sources: usize,
    metadata: Vec<String>,
    diagnostics: Vec<String>,
    libraries: Vec<LibrarySummary>,
}

#[derive(Serialize, Debug)]
struct LibrarySummary {
    name: String,
    external: bool,
    dependencies: usize,
    typedefs: usize,
    classes: Vec<ClassSummary>,
    fields: Vec<String>,
    procedures: Vec<String>,
}

#[derive(Serialize, Debug)]
struct ClassSummary {
    name: String,
    fields: Vec<String>,
    constructors: Vec<String>,
    procedures: Vec<String>,
}

impl LibrarySummary {
    fn new(library: &Library, names: &NameResolver<'_>) -> Result<Self> {
        let name = match names.string(library.name)? {
            Some(name) => name.to_owned(),
            None => names.display(library.canonical_name.canonical_name())?,
        };
        Ok(LibrarySummary {
            name,
            external: library.is_external(),
            dependencies: library.dependencies.len(),
            typedefs: library.typedefs.len(),
            classes: library
                .classes
                .iter()
                .map(|class| ClassSummary::new(class, names))
                .collect::<Result<_>>()?,
            fields: library
                .fields
                .iter()
                .map(|field| Ok(names.name(&field.name)?))
                .collect::<Result<_>>()?,
            procedures: procedure_names(&library.procedures, names)?,
        })
    }
}

impl ClassSummary {
    fn new(class: &Class, names: &NameResolver<'_>) -> Result<Self> {
        Ok(ClassSummary {
            name: names.string(class.name)?.unwrap_or("<anonymous>").to_owned(),
            fields: class
                .fields
                .iter()
                .map(|field| Ok(names.name(&field.name)?))
                .collect::<Result<_>>()?,
            constructors: class
                .constructors
                .iter()
                .map(|constructor| Ok(names.name(&constructor.name)?))
                .collect::<Result<_>>()?,
            procedures: procedure_names(&class.procedures, names)?,
        })
    }
}

fn procedure_names(procedures: &[Procedure], names: &NameResolver<'_>) -> Result<Vec<String>> {
    procedures
        .iter()
        .map(|procedure| Ok(names.name(&procedure.name)?))
        .collect()
}

fn summarize(component: &ComponentFile) -> Result<ComponentSummary> {
    let names = component.resolver();
    Ok(ComponentSummary {
        version: component.version().0,
        problems: component.problems().to_vec(),
        main_method: component.main_method()?,
        strings: component.strings().len(),
        canonical_names: component.canonical_names().len(),
        constants: component.constants.len(),
        sources: component.source_map.len(),
        metadata: component.metadata.mappings().keys().cloned().collect(),
        diagnostics: component
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect(),
        libraries: component
            .libraries
            .iter()
            .map(|library| LibrarySummary::new(library, &names))
            .collect::<Result<_>>()?,
    })
}

fn print_library(summary: &LibrarySummary) {
    let marker = if summary.external { " (external)" } else { "" };
    println!("library {}{marker}", summary.name);
    for class in &summary.classes {
        println!("  class {}", class.name);
        for field in &class.fields {
            println!("    field {field}");
        }
        for constructor in &class.constructors {
            println!("    constructor {constructor}");
        }
        for procedure in &class.procedures {
            println!("    procedure {procedure}");
        }
    }
    for field in &summary.fields {
        println!("  field {field}");
    }
    for procedure in &summary.procedures {
        println!("  procedure {procedure}");
    }
}

fn print_summary(summary: &ComponentSummary) {
    println!("format version {}", summary.version);
    if let Some(main) = &summary.main_method {
        println!("main method {main}");
    }
    println!(
        "{} strings, {} canonical names, {} constants, {} sources",
        summary.strings, summary.canonical_names, summary.constants, summary.sources
    );
    for tag in &summary.metadata {
        println!("metadata {tag}");
    }
    for diagnostic in &summary.diagnostics {
        println!("warning: {diagnostic}");
    }
    for library in &summary.libraries {
        print_library(library);
    }
}

fn emit<T: Serialize>(value: &T, json: bool, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("failed to serialize summary")?
        );
    } else {
        text(value);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = CLI::parse();

    let path = if cli.compile {
        compile_to_kernel(&cli.dart, &cli.input)?
    } else {
        cli.input.clone()
    };
    let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let options = DecodeOptions::new()
        .assert_synthetic(cli.assert_synthetic)
        .parallel(cli.parallel);

    if let Some(index) = cli.library {
        let view = ComponentView::open_with_options(bytes, options)
            .with_context(|| format!("failed to open {}", path.display()))?;
        if index >= view.library_count() {
            bail!(
                "library {index} out of range: component has {} libraries",
                view.library_count()
            );
        }
        let library = view
            .library(index)
            .with_context(|| format!("failed to decode library {index}"))?;
        let names = view.session().resolver();
        let summary = LibrarySummary::new(&library, &names)?;
        return emit(&summary, cli.json, print_library);
    }

    let component = ComponentFile::load_with_options(bytes, options)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    let summary = summarize(&component)?;
    emit(&summary, cli.json, print_summary)
}
