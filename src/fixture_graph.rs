//! Fixture dependency graph: topological resolution order, cycle detection
//!
//! When an autouse fixture is lowered into a lifecycle method, its
//! dependencies must be materialised first. The reachable subgraph is
//! ordered depth-first; a cycle is a hard error with no recovery.

use crate::model::ModuleModel;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from resolving a fixture dependency chain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("fixture dependency cycle involving '{0}'")]
    Cycle(String),
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Dependency-first order of the module fixtures reachable from `root_name`,
/// ending with the root itself. Dependencies that name no module fixture are
/// omitted (the caller decides whether they are framework holes).
pub fn dependency_order(
    module: &ModuleModel,
    root_name: &str,
) -> Result<Vec<String>, ResolveError> {
    let mut order = Vec::new();
    let mut marks: HashMap<String, Mark> = HashMap::new();
    visit(module, root_name, &mut marks, &mut order)?;
    Ok(order)
}

fn visit(
    module: &ModuleModel,
    name: &str,
    marks: &mut HashMap<String, Mark>,
    order: &mut Vec<String>,
) -> Result<(), ResolveError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => return Err(ResolveError::Cycle(name.to_string())),
        None => {}
    }
    let Some(fixture) = module.fixture(name) else {
        return Ok(());
    };
    marks.insert(name.to_string(), Mark::InProgress);
    for dep in &fixture.deps {
        visit(module, dep, marks, order)?;
    }
    marks.insert(name.to_string(), Mark::Done);
    order.push(name.to_string());
    Ok(())
}

/// First cycle among the fixtures reachable from any autouse fixture, if any
pub fn autouse_cycle(module: &ModuleModel) -> Option<String> {
    for fixture in module.fixtures.iter().filter(|f| f.autouse) {
        if let Err(ResolveError::Cycle(name)) = dependency_order(module, &fixture.name) {
            return Some(name);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::python::PythonParser;
    use crate::recognizer::recognize;

    fn parse(source: &str) -> tree_sitter::Tree {
        PythonParser::new().unwrap().parse(source).unwrap()
    }

    #[test]
    fn orders_dependencies_before_dependents() {
        let src = "import pytest\n\n\
            @pytest.fixture\ndef a():\n    return 1\n\n\
            @pytest.fixture\ndef b(a):\n    return a + 1\n\n\
            @pytest.fixture(autouse=True)\ndef c(b):\n    return b + 1\n";
        let tree = parse(src);
        let model = recognize(&tree, src);
        let order = dependency_order(&model, "c").unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn shared_dependency_is_emitted_once() {
        let src = "import pytest\n\n\
            @pytest.fixture\ndef base():\n    return 0\n\n\
            @pytest.fixture\ndef left(base):\n    return base\n\n\
            @pytest.fixture\ndef right(base):\n    return base\n\n\
            @pytest.fixture(autouse=True)\ndef top(left, right):\n    return left + right\n";
        let tree = parse(src);
        let model = recognize(&tree, src);
        let order = dependency_order(&model, "top").unwrap();
        assert_eq!(order, vec!["base", "left", "right", "top"]);
    }

    #[test]
    fn detects_cycle() {
        let src = "import pytest\n\n\
            @pytest.fixture(autouse=True)\ndef a(b):\n    return b\n\n\
            @pytest.fixture\ndef b(a):\n    return a\n";
        let tree = parse(src);
        let model = recognize(&tree, src);
        assert!(matches!(
            dependency_order(&model, "a"),
            Err(ResolveError::Cycle(_))
        ));
        assert!(autouse_cycle(&model).is_some());
    }

    #[test]
    fn framework_names_are_skipped() {
        let src = "import pytest\n\n\
            @pytest.fixture(autouse=True)\ndef env(monkeypatch):\n    return monkeypatch\n";
        let tree = parse(src);
        let model = recognize(&tree, src);
        let order = dependency_order(&model, "env").unwrap();
        assert_eq!(order, vec!["env"]);
    }
}
