use clap::{Parser, Subcommand};
use mdx_remote::materialize::DirectoryMaterializer;
use mdx_remote::plugin::Plugin;
use mdx_remote::types::ContentNode;
use mdx_remote::{config, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mdx-remote")]
#[command(about = "Turn content records into MDX documents")]
#[command(long_about = "\
Turn content records into MDX documents

Each record of a configured type becomes one .mdx file: front-matter from
the record's metadata field, then the markdown body with every inline image
replaced by a lazily resolved <GatsbyImage> embed. The image URLs are listed
in the front-matter so the site build can download them.

Node file (JSON array):

  [
    {
      \"id\": \"post-1\",
      \"type\": \"BlogPost\",
      \"fields\": {
        \"content\": { \"body\": \"![Dawn](https://cdn.example/dawn.jpg)\" },
        \"meta\": { \"title\": \"Dawn\" }
      }
    }
  ]

Run 'mdx-remote gen-config' to generate a documented mdx-remote.toml.")]
#[command(version)]
struct Cli {
    /// Plugin configuration file
    #[arg(long, default_value = "mdx-remote.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble every configured node and write the .mdx files
    Assemble {
        /// JSON file holding an array of content nodes
        #[arg(long)]
        nodes: PathBuf,
        /// Directory the documents are written to
        #[arg(long, default_value = "mdx")]
        output: PathBuf,
    },
    /// Validate the config (and optionally a node file) without writing
    Check {
        /// JSON file holding an array of content nodes
        #[arg(long)]
        nodes: Option<PathBuf>,
    },
    /// Print a stock mdx-remote.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Assemble {
            nodes,
            output: out_dir,
        } => {
            let plugin_config = config::load_config(&cli.config)?;
            let nodes = read_nodes(&nodes)?;

            println!("==> Assembling {} nodes → {}", nodes.len(), out_dir.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = {
                let out_dir = out_dir.clone();
                std::thread::spawn(move || output::print_events(rx, &out_dir))
            };

            let plugin = Plugin::new(plugin_config)?.with_events(tx);
            let materializer = DirectoryMaterializer::new(&out_dir);
            for assembly in plugin.assemble_all(&nodes) {
                plugin.write_assembly(assembly, &materializer)?;
            }
            drop(plugin);

            printer
                .join()
                .map_err(|_| "output thread panicked")?;
        }
        Command::Check { nodes } => {
            println!("==> Checking {}", cli.config.display());
            let plugin = Plugin::new(config::load_config(&cli.config)?)?;
            for (name, type_config) in &plugin.config().node_types {
                println!("    {} ← {}", name, type_config.body_field);
            }
            if let Some(nodes_path) = nodes {
                let nodes = read_nodes(&nodes_path)?;
                let assemblies = plugin.assemble_all(&nodes);
                let configured = assemblies.len();
                for assembly in assemblies {
                    assembly.result?;
                }
                println!(
                    "    {} nodes, {} of a configured type",
                    nodes.len(),
                    configured
                );
            }
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Read a JSON array of content nodes.
fn read_nodes(path: &Path) -> Result<Vec<ContentNode>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}
