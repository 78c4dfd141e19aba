use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use popcat_core::MapResolver;
use popcat_utils::DirectoryFetcher;

#[derive(Parser, Debug)]
#[command(version, about = "Browse and validate the population genetics catalog")]
struct Args {
    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List species with their demographic models and DFEs
    List,
    /// Print a demographic model as JSON
    Show { species: String, model: String },
    /// Print a DFE as JSON
    Dfe { species: String, dfe: String },
    /// Load a catalog file (JSON or Dhall) on top of the built-in catalog
    Validate { file: PathBuf },
    /// Print the local path of a chromosome's genetic map
    MapPath {
        /// Directory holding unpacked maps, one subdirectory per map
        #[arg(long)]
        cache: PathBuf,
        map: String,
        chromosome: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Show { .. } => "show",
            Command::Dfe { .. } => "dfe",
            Command::Validate { .. } => "validate",
            Command::MapPath { .. } => "map-path",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("running `{}`", args.command.name());

    match args.command {
        Command::List => {
            let catalog = species_impls::builtin()?;
            for species in catalog.species() {
                println!("{} ({})", species.id(), species.scientific_name());
                for model in species.demographic_models() {
                    println!("  model  {:<28} {}", model.id(), model.description());
                }
                for dfe in species.dfes() {
                    println!("  dfe    {:<28} {}", dfe.id(), dfe.description());
                }
            }
            for map in catalog.genetic_maps() {
                println!("map {}", map.id());
            }
        }
        Command::Show { species, model } => {
            let catalog = species_impls::builtin()?;
            let model = catalog.get_demographic_model(&species, &model)?;
            println!("{}", serde_json::to_string_pretty(&**model)?);
        }
        Command::Dfe { species, dfe } => {
            let catalog = species_impls::builtin()?;
            let dfe = catalog.get_dfe(&species, &dfe)?;
            println!("{}", serde_json::to_string_pretty(&**dfe)?);
        }
        Command::Validate { file } => {
            let builder = species_impls::builtin_builder()?;
            let catalog = popcat_utils::read_catalog(builder, &file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            println!("{}: ok ({} species)", file.display(), catalog.nr_species());
        }
        Command::MapPath {
            cache,
            map,
            chromosome,
        } => {
            let catalog = species_impls::builtin()?;
            let map = catalog.get_genetic_map(&map)?;
            let resolver = MapResolver::new(DirectoryFetcher::new(cache));
            let resolved = resolver.resolve(map)?;
            let path = resolved.chromosome_path(&chromosome);
            if !path.is_file() {
                log::warn!("{} does not exist", path.display());
            }
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_match_subcommands() {
        let args = Args::try_parse_from([
            "popcat",
            "-v",
            "map-path",
            "--cache",
            "/tmp/maps",
            "HapmapII_GRCh37",
            "chr22",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.command.name(), "map-path");
        let args =
            Args::try_parse_from(["popcat", "show", "MusMus", "DomesticusEurope_1F22"]).unwrap();
        assert!(!args.verbose);
        assert_eq!(args.command.name(), "show");
    }
}
