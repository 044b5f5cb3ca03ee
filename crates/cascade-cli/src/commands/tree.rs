//! Tree command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use cascade_core::ownership::{OwnerTree, OwnershipNode};
use cascade_ext_file::{load_snapshot, DataFiles};

use crate::cli::OutputFormat;
use crate::output::{print_info, print_json};

/// Arguments for the tree command.
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Investor or fund id
    #[arg(short, long)]
    pub investor: String,
}

/// JSON shape of a holding and everything below it.
#[derive(Debug, Serialize)]
struct TreeNode {
    position: String,
    kind: &'static str,
    asset: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    holdings: Vec<TreeNode>,
}

impl From<&OwnershipNode> for TreeNode {
    fn from(node: &OwnershipNode) -> Self {
        Self {
            position: node.position_id().to_string(),
            kind: node.kind().as_str(),
            asset: node.asset_key().to_string(),
            holdings: node.children().iter().map(TreeNode::from).collect(),
        }
    }
}

/// Execute the tree command.
pub fn execute(args: TreeArgs, files: &DataFiles, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(files)?;
    let tree = snapshot.owner_tree(&args.investor);

    if tree.is_empty() {
        print_info(&format!("No holdings recorded for {}", args.investor));
    }

    match format {
        OutputFormat::Json => {
            let holdings: Vec<_> = tree.holdings().iter().map(TreeNode::from).collect();
            print_json(&holdings)
        }
        OutputFormat::Table | OutputFormat::Minimal => {
            for line in render(&tree) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// One line per holding, indented by fund depth.
fn render(tree: &OwnerTree) -> Vec<String> {
    let mut lines = vec![tree.owner_id().to_string()];
    tree.walk(|depth, node| {
        lines.push(format!(
            "{}{} {} {}",
            "    ".repeat(depth + 1),
            node.position_id(),
            node.kind().as_str(),
            node.asset_key()
        ));
    });
    lines
}
