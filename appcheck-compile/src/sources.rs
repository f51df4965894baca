//! Checkable JavaScript extracted from datasource queries and widget event handlers.

use std::{
    collections::HashMap,
    fmt::Write,
    path::{Path, PathBuf},
};

use appcheck::prelude::*;
use log::debug;

use crate::{
    events::{events_of, param_type},
    util::{decode_hex_escapes, references_query},
};

pub const QUERIES_DIR: &str = "queries";
pub const HANDLERS_DIR: &str = "handlers";

const VIEW_FRAGMENT_CLASS: &str = "ViewFragment";

/// A generated source file, relative to the scratch directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticSource {
    pub path: PathBuf,
    pub text: String,
}

impl SyntheticSource {
    fn new(dir: &str, name: &str, functions: &[String]) -> Self {
        SyntheticSource {
            path: Path::new(dir).join(format!("{}.js", name)),
            text: functions.join("\n\n") + "\n",
        }
    }
}

/// Query functions first, then event handlers.
pub fn compile_sources(project: &Project) -> Vec<SyntheticSource> {
    let mut sources = compile_queries(&project.models);
    sources.extend(compile_handlers(&project.views));
    sources
}

/// One `queries/<Model>.js` per model with at least one custom query.
pub fn compile_queries(models: &[Model]) -> Vec<SyntheticSource> {
    models
        .iter()
        .filter_map(|model| {
            let functions: Vec<_> = model
                .data_sources
                .iter()
                .filter_map(|data_source| query_function(model, data_source))
                .collect();
            if functions.is_empty() {
                return None;
            }

            debug!("extracted {} queries of model {}", functions.len(), model.name);
            Some(SyntheticSource::new(QUERIES_DIR, &model.name, &functions))
        })
        .collect()
}

fn query_function(model: &Model, data_source: &DataSource) -> Option<String> {
    if data_source.kind != DataSourceKind::Query {
        debug!(
            "skipping {} datasource {}.{}",
            data_source.kind, model.name, data_source.name
        );
        return None;
    }
    let custom_query = data_source
        .custom_query
        .as_deref()
        .filter(|query| !query.trim().is_empty())?;

    let body = decode_hex_escapes(custom_query);
    let takes_query = references_query(&body);

    let mut function = String::new();
    writeln!(function, "/**\n * {}.{}", model.name, data_source.name).unwrap();
    if takes_query {
        writeln!(
            function,
            " * @param {{{}}} query",
            query_type(model, data_source)
        )
        .unwrap();
    }
    writeln!(function, " */").unwrap();
    write!(
        function,
        "function {}_{}({}) {{\n{}\n}}",
        model.name,
        data_source.name,
        if takes_query { "query" } else { "" },
        body
    )
    .unwrap();

    Some(function)
}

fn query_type(model: &Model, data_source: &DataSource) -> String {
    let member = |key: &str| format!("Datasources[\"{}\"][\"{}\"]", data_source.name, key);

    let mut args = vec![model.type_name()];
    if data_source.custom_properties.is_some() {
        args.push(member("parameters"));
        args.push(member("customProperties"));
    } else if data_source.parameters.is_some() {
        args.push(member("parameters"));
    }

    format!("Query<{}>", args.join(", "))
}

/// One `handlers/<View>.js` per view with at least one non-empty handler.
pub fn compile_handlers(views: &[View]) -> Vec<SyntheticSource> {
    views
        .iter()
        .filter_map(|view| {
            let functions = extract_handlers(view);
            if functions.is_empty() {
                return None;
            }

            debug!(
                "extracted {} handlers of {} {}",
                functions.len(),
                view.kind(),
                view.name
            );
            let mut blocks = vec![format!("/** {}: {} */", view.kind(), view.name)];
            blocks.extend(functions);
            Some(SyntheticSource::new(HANDLERS_DIR, &view.name, &blocks))
        })
        .collect()
}

fn extract_handlers(view: &View) -> Vec<String> {
    let mut extractor = HandlerExtractor {
        names: vec![view.name.as_str()],
        seen: HashMap::new(),
        functions: Vec::new(),
    };
    traverse(&view.root, &mut extractor);

    extractor.functions
}

struct HandlerExtractor<'a> {
    /// Names of the enclosing view and view fragments, outermost first.
    names: Vec<&'a str>,
    seen: HashMap<String, usize>,
    functions: Vec<String>,
}

impl<'a> HandlerExtractor<'a> {
    fn unique_name(&mut self, name: String) -> String {
        let count = self.seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            name
        } else {
            format!("{}_{}", name, count)
        }
    }
}

fn fragment_name<'a>(node: &ComponentNode<'a>) -> Option<&'a str> {
    if node.class() == VIEW_FRAGMENT_CLASS {
        node.attribute("name")
    } else {
        None
    }
}

impl<'a> ComponentVisitor<'a> for HandlerExtractor<'a> {
    fn enter(&mut self, node: ComponentNode<'a>) {
        if let Some(name) = fragment_name(&node) {
            self.names.push(name);
        }

        let class = node.class();
        for signature in events_of(class) {
            let body = match node.property(signature.event) {
                Some(body) if !body.trim().is_empty() => body,
                _ => continue,
            };

            let name = self.unique_name(format!(
                "{}__{}__{}",
                self.names.join("__"),
                signature.event,
                class
            ));

            let mut function = String::from("/**\n");
            for param in signature.params {
                writeln!(function, " * @param {{{}}} {}", param_type(param, class), param)
                    .unwrap();
            }
            write!(
                function,
                " */\nfunction {}({}) {{\n{}\n}}",
                name,
                signature.params.join(", "),
                body
            )
            .unwrap();

            self.functions.push(function);
        }
    }

    fn exit(&mut self, node: ComponentNode<'a>) {
        if fragment_name(&node).is_some() {
            self.names.pop();
        }
    }
}
