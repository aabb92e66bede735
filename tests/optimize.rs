use codemap::CodeMap;
use copt::{ast, codegen, diagnostics::Diagnostics, optimization, parser};

fn optimize(source_code: &str) -> String {
    let mut code_map = CodeMap::new();
    let file =
        code_map.add_file("<test>".to_owned(), source_code.to_owned());
    let mut diagnostics = Diagnostics::default();
    let cst = parser::parse(&file, &mut diagnostics);
    let mut unit = ast::lowering::lower(cst, &file, &mut diagnostics);
    assert!(!diagnostics.has_errors(), "test source failed to parse");
    optimization::optimize(&mut unit);
    codegen::render(&unit)
}

#[test]
fn folds_constant_initializers() {
    assert_eq!(
        optimize("int main() { int a = 2 + 3; return a; }"),
        "int main()\n\
         {\n\
         \x20   int a = 5;\n\
         \x20   return a;\n\
         }\n",
    );
}

#[test]
fn propagates_and_folds() {
    // Once `b` folds to a literal, nothing reads `a` any more and its
    // declaration is eliminated as dead.
    assert_eq!(
        optimize("int main() { int a = 4; int b = a * 2; return b; }"),
        "int main()\n\
         {\n\
         \x20   int b = 8;\n\
         \x20   return b;\n\
         }\n",
    );
}

#[test]
fn reassignment_keeps_the_multiply_symbolic() {
    // `a` is reassigned, so `b` may not become a literal; the multiply is
    // strength-reduced instead and routed through the shared temporary.
    assert_eq!(
        optimize(
            "int main() { int a = 4; a = a + 1; int b = a * 2; return b; }",
        ),
        "int main()\n\
         {\n\
         \x20   int a = 4;\n\
         \x20   a = 5;\n\
         \x20   int _t0 = a << 1;\n\
         \x20   int b = _t0;\n\
         \x20   return b;\n\
         }\n",
    );
}

#[test]
fn reduces_power_of_two_multiplication() {
    assert_eq!(
        optimize("int f(int x) { return x * 8; }"),
        "int f(int x)\n\
         {\n\
         \x20   return x << 3;\n\
         }\n",
    );
}

#[test]
fn leaves_other_multiplications_alone() {
    assert_eq!(
        optimize("int f(int x) { return x * 6; }"),
        "int f(int x)\n\
         {\n\
         \x20   return x * 6;\n\
         }\n",
    );
}

#[test]
fn removes_dead_branches_and_unreachable_code() {
    assert_eq!(
        optimize(
            "int main() { if (0) { int z = 1; } if (1) { return 1; } return 0; }",
        ),
        "int main()\n\
         {\n\
         \x20   return 1;\n\
         }\n",
    );
}

#[test]
fn removes_never_entered_loops() {
    assert_eq!(
        optimize(
            "int main() { int keep = 2; while (0) { keep = 3; } return keep; }",
        ),
        "int main()\n\
         {\n\
         \x20   int keep = 2;\n\
         \x20   return keep;\n\
         }\n",
    );
}

#[test]
fn shares_repeated_subexpressions() {
    assert_eq!(
        optimize(
            "int f(int x) { int a = x + 1; int p = a + a; int q = a + a; return p + q; }",
        ),
        "int f(int x)\n\
         {\n\
         \x20   int a = x + 1;\n\
         \x20   int _t0 = a + a;\n\
         \x20   int p = _t0;\n\
         \x20   int q = _t0;\n\
         \x20   return p + q;\n\
         }\n",
    );
}

#[test]
fn hoists_loop_invariant_initializers_only() {
    assert_eq!(
        optimize(
            "int f(int n, int s) { for (int i = 0; i < n; i++) { int k = n + 1; s = s + k; } return s; }",
        ),
        "int f(int n, int s)\n\
         {\n\
         \x20   for (int i = 0; i < n; i = i + 1)\n\
         \x20   {\n\
         \x20       int _t0 = n + 1;\n\
         \x20       int k = _t0;\n\
         \x20       s = s + k;\n\
         \x20   }\n\
         \x20   return s;\n\
         }\n",
    );
}

#[test]
fn parenthesizes_where_precedence_demands_it() {
    assert_eq!(
        optimize("int f(int a, int b, int c) { return a * (b + c); }"),
        "int f(int a, int b, int c)\n\
         {\n\
         \x20   return a * (b + c);\n\
         }\n",
    );
}

#[test]
fn rendering_is_stable_under_reparsing() {
    fn reformat(source_code: &str) -> String {
        let mut code_map = CodeMap::new();
        let file =
            code_map.add_file("<test>".to_owned(), source_code.to_owned());
        let mut diagnostics = Diagnostics::default();
        let cst = parser::parse(&file, &mut diagnostics);
        let unit = ast::lowering::lower(cst, &file, &mut diagnostics);
        assert!(!diagnostics.has_errors(), "source failed to reparse");
        codegen::render(&unit)
    }

    // One of every node kind, no optimization involved.
    let source = "int f(int n) {
        int a;
        int b = 0 - 1;
        a = -4;
        for (int i = 0, j = 2; i < n; i++) { b = b + i * j; }
        for (a = 0; a < 8; a = a + 2) { }
        while (a != n) { a = a + 1; }
        if (a >= n) { return a % 2; } else return (a + b) * 2;
        return 0;
    }";
    let rendered = reformat(source);
    assert_eq!(reformat(&rendered), rendered);
}

#[test]
fn the_pipeline_is_deterministic() {
    let source = "int main() { int a = 1; int b = a + 2; for (int i = 0; i < b; i++) { int k = b * 4; b = b + k; } if (1) { return b; } return 0; }";
    assert_eq!(optimize(source), optimize(source));
}
