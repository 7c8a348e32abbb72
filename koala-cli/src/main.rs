//! Koala HTML CLI
//!
//! Parses a document or fragment and prints the tree, the token stream or a
//! JSON rendering, followed by the parse errors.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use koala_dom::{DomTree, Namespace, NodeId, NodeType};
use koala_html::{
    FragmentContext, HTMLTokenizer, ParseOutput, ParserConfig, Token, parse_document_with_config,
    parse_fragment_with_config, tree_to_string,
};
use owo_colors::OwoColorize;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

/// Koala HTML - WHATWG HTML tokenizer and tree builder
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the DOM tree of a file
    koala ./index.html

    # Parse inline HTML
    koala --html '<p>One<p>Two'

    # Parse a fragment in a table row context
    koala --fragment tr --html '<td>cell'

    # Print the token stream instead
    koala --tokens --html '<![CDATA[x]]><?php echo 1 ?>'

    # Machine-readable output
    koala --json ./index.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE", conflicts_with = "html")]
    path: Option<PathBuf>,

    /// Parse HTML string directly instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Parse as a fragment with this context element (`div`, `svg:g`, `math:mi`)
    #[arg(short, long, value_name = "CONTEXT")]
    fragment: Option<FragmentContext>,

    /// Print the token stream instead of the tree
    #[arg(short, long)]
    tokens: bool,

    /// Print the tree and errors as JSON
    #[arg(short, long)]
    json: bool,

    /// Store at most this many parse errors
    #[arg(long, value_name = "N")]
    max_errors: Option<usize>,

    /// Echo parse errors as they are diagnosed
    #[arg(long)]
    log_errors: bool,

    /// Log insertion mode switches and other tree builder events
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let input = match (&cli.html, &cli.path) {
        (Some(html), _) => html.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("expected a FILE or --html '<html>...</html>'"),
    };

    if cli.tokens {
        print_tokens(&input);
        return Ok(());
    }

    let mut config = ParserConfig::default().with_log_errors(cli.log_errors);
    if let Some(max_errors) = cli.max_errors {
        config = config.with_max_errors(max_errors);
    }
    let output = match &cli.fragment {
        Some(context) => parse_fragment_with_config(&input, context, config),
        None => parse_document_with_config(&input, config),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output_to_json(&output))?);
    } else {
        print_output(&output);
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug output for the parser.
fn init_tracing(verbose: bool) {
    let default = if verbose { "koala_html=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_tokens(input: &str) {
    let mut tokenizer = HTMLTokenizer::new(input);
    loop {
        let token = tokenizer.next_token();
        let position = tokenizer.token_position();
        println!("{}:{}\t{token}", position.line, position.column);
        if matches!(token, Token::EndOfFile) {
            break;
        }
    }
    for error in tokenizer.take_errors() {
        eprintln!("{}", error.to_string().yellow());
    }
}

fn print_output(output: &ParseOutput) {
    println!("{}", "=== DOM Tree ===".bold());
    print!("{}", tree_to_string(&output.tree, output.tree.root()));

    println!("\n{}", "=== Parse Errors ===".bold());
    if output.errors.is_empty() {
        println!("{}", "none".green());
    }
    for error in &output.errors {
        println!("{}", error.to_string().yellow());
    }
    if output.dropped_errors > 0 {
        println!("... and {} more", output.dropped_errors);
    }
}

/// `tree` is a flat list in tree order. Nodes refer to each other by `id`, so
/// the JSON stays shallow however deep the document nests.
fn output_to_json(output: &ParseOutput) -> Value {
    json!({
        "mode": format!("{:?}", output.tree.mode()),
        "tree": tree_to_json(&output.tree),
        "errors": output.errors,
        "dropped_errors": output.dropped_errors,
    })
}

fn tree_to_json(tree: &DomTree) -> Vec<Value> {
    let root = tree.root();
    std::iter::once(root)
        .chain(tree.descendants(root))
        .filter_map(|id| node_to_json(tree, id))
        .collect()
}

fn node_to_json(tree: &DomTree, id: NodeId) -> Option<Value> {
    let node = tree.get(id)?;
    let mut value = match &node.node_type {
        NodeType::Document => json!({ "type": "document" }),
        NodeType::DocumentFragment => json!({ "type": "fragment" }),
        NodeType::DocumentType(doctype) => json!({
            "type": "doctype",
            "name": doctype.name,
            "public_id": doctype.public_id,
            "system_id": doctype.system_id,
        }),
        NodeType::Element(data) => {
            // array, to keep source order
            let attrs: Vec<Value> = data
                .attrs
                .iter()
                .map(|attr| {
                    json!({
                        "name": attr.qualified_name(),
                        "namespace": attr.namespace.map(Namespace::url),
                        "value": attr.value,
                    })
                })
                .collect();
            json!({
                "type": "element",
                "namespace": data.namespace.url(),
                "name": data.tag_name,
                "attributes": attrs,
            })
        }
        NodeType::Text(text) => json!({ "type": "text", "data": text }),
        NodeType::CdataSection(data) => json!({ "type": "cdata", "data": data }),
        NodeType::ProcessingInstruction { target, data } => json!({
            "type": "processing-instruction",
            "target": target,
            "data": data,
        }),
        NodeType::Comment(data) => json!({ "type": "comment", "data": data }),
    };
    if let Value::Object(fields) = &mut value {
        let _ = fields.insert("id".to_string(), json!(id.0));
        let _ = fields.insert("parent".to_string(), json!(tree.parent(id).map(|p| p.0)));
        let children: Vec<usize> = tree.children(id).iter().map(|child| child.0).collect();
        let _ = fields.insert("children".to_string(), json!(children));
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use koala_html::parse_document;

    use super::*;

    fn first_element<'a>(nodes: &'a [Value], name: &str) -> &'a Value {
        nodes
            .iter()
            .find(|node| node["type"] == "element" && node["name"] == name)
            .expect("element in JSON tree")
    }

    #[test]
    fn test_attributes_keep_source_order() {
        let output = parse_document("<!DOCTYPE html><a zeta=1 href=x alpha=2 id=y>");
        let nodes = tree_to_json(&output.tree);
        let names: Vec<&str> = first_element(&nodes, "a")["attributes"]
            .as_array()
            .expect("attribute array")
            .iter()
            .filter_map(|attr| attr["name"].as_str())
            .collect();
        assert_eq!(names, ["zeta", "href", "alpha", "id"]);
    }

    #[test]
    fn test_foreign_attribute_namespace() {
        let output = parse_document("<!DOCTYPE html><svg><a xlink:href=#t></a></svg>");
        let nodes = tree_to_json(&output.tree);
        let attr = &nodes
            .iter()
            .find(|node| node["namespace"] == "http://www.w3.org/2000/svg" && node["name"] == "a")
            .expect("svg a")["attributes"][0];
        assert_eq!(attr["name"], "xlink:href");
        assert_eq!(attr["namespace"], "http://www.w3.org/1999/xlink");
        assert_eq!(attr["value"], "#t");
    }

    #[test]
    fn test_nodes_link_by_id() {
        let output = parse_document("<!DOCTYPE html><p>one<!--two-->");
        let nodes = tree_to_json(&output.tree);
        assert_eq!(nodes[0]["type"], "document");
        assert_eq!(nodes[0]["parent"], Value::Null);

        let p = first_element(&nodes, "p");
        let children = p["children"].as_array().expect("children");
        assert_eq!(children.len(), 2);
        let text = nodes
            .iter()
            .find(|node| node["id"] == children[0])
            .expect("text node");
        assert_eq!(text["data"], "one");
        assert_eq!(text["parent"], p["id"]);
    }

    #[test]
    fn test_deep_nesting_serializes_on_a_small_stack() {
        const DEPTH: usize = 5_000;
        let output = parse_document(&format!("<!DOCTYPE html>{}", "<div>".repeat(DEPTH)));
        let json = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || serde_json::to_string(&output_to_json(&output)))
            .expect("spawn")
            .join()
            .expect("JSON rendering overflowed the stack")
            .expect("serialize");
        assert_eq!(json.matches(r#""name":"div""#).count(), DEPTH);
    }
}
