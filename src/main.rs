#![deny(unsafe_code)]
#![warn(clippy::nursery, clippy::pedantic)]

use codemap::CodeMap;
use copt::{ast, codegen, diagnostics::Diagnostics, optimization, parser};

fn main() {
    let mut code_map = CodeMap::default();
    let mut diagnostics = Diagnostics::default();
    let result = real_main(&mut code_map, &mut diagnostics);
    diagnostics.show(&code_map);
    if result.is_err() {
        std::process::exit(1);
    }
}

fn real_main(
    code_map: &mut CodeMap,
    diagnostics: &mut Diagnostics,
) -> Result<(), ()> {
    let mut args = std::env::args().skip(1);
    let source_file = args
        .next()
        .ok_or_else(|| diagnostics.error("no source file provided", []))?;
    let output_file = args.next();
    let source_code =
        std::fs::read_to_string(&source_file).map_err(|err| {
            diagnostics.error("failed to read source code", []);
            diagnostics.note(err.to_string(), []);
        })?;
    let file = code_map.add_file(source_file, source_code);
    let cst = parser::parse(&file, diagnostics);
    let mut unit = ast::lowering::lower(cst, &file, diagnostics);
    if diagnostics.has_errors() {
        return Err(());
    }
    optimization::optimize(&mut unit);
    let output = codegen::render(&unit);
    match output_file {
        Some(path) => std::fs::write(path, output).map_err(|err| {
            diagnostics.error("failed to write output", []);
            diagnostics.note(err.to_string(), []);
        }),
        None => {
            print!("{output}");
            Ok(())
        }
    }
}
