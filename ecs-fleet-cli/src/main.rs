use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use ecs_fleet_awscc::{SsmParameterStore, TemplateRenderer, to_json_string};
use ecs_fleet_core::config::FleetConfig;
use ecs_fleet_core::network::REQUIRED_KEYS;
use ecs_fleet_core::parameter::{ParameterStore, StaticParameterStore};
use ecs_fleet_core::provisioner::{FleetStack, ServiceFleetProvisioner};
use ecs_fleet_core::resource::{Resource, Value};
use ecs_fleet_core::stack::ResourceGroup;

#[derive(Parser)]
#[command(name = "ecs-fleet")]
#[command(about = "Declare ECS Fargate service fleets behind an Application Load Balancer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the fleet file and the resources it declares
    Validate {
        /// Path to fleet file (.json, .yaml)
        #[arg(default_value = "fleet.yaml")]
        file: PathBuf,
    },
    /// Print or write the CloudFormation template
    Synth {
        /// Path to fleet file (.json, .yaml)
        #[arg(default_value = "fleet.yaml")]
        file: PathBuf,

        /// Write the template to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        params: ParameterArgs,
    },
    /// Show the declared resources grouped by service
    Plan {
        /// Path to fleet file (.json, .yaml)
        #[arg(default_value = "fleet.yaml")]
        file: PathBuf,

        #[command(flatten)]
        params: ParameterArgs,
    },
    /// Compare a previously written template with a fresh synthesis
    Diff {
        /// Path to fleet file (.json, .yaml)
        #[arg(default_value = "fleet.yaml")]
        file: PathBuf,

        /// Template to compare against
        #[arg(long)]
        against: PathBuf,

        #[command(flatten)]
        params: ParameterArgs,
    },
    /// Check that every shared parameter the fleet needs exists
    Params {
        #[command(flatten)]
        params: ParameterArgs,
    },
}

/// Where shared network and cluster parameters come from
///
/// Without a source, lookups are left to CloudFormation at deploy time.
#[derive(Args, Debug, Default)]
struct ParameterArgs {
    /// JSON object file mapping parameter keys to values
    #[arg(long, conflicts_with = "ssm")]
    params: Option<PathBuf>,

    /// Resolve parameters from AWS Systems Manager
    #[arg(long)]
    ssm: bool,

    /// AWS region for --ssm (defaults to the provider chain)
    #[arg(long, requires = "ssm")]
    region: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file).await,
        Commands::Synth {
            file,
            output,
            params,
        } => run_synth(&file, output.as_deref(), &params).await,
        Commands::Plan { file, params } => run_plan(&file, &params).await,
        Commands::Diff {
            file,
            against,
            params,
        } => run_diff(&file, &against, &params).await,
        Commands::Params { params } => run_params(&params).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn parameter_store(args: &ParameterArgs) -> Result<Option<Box<dyn ParameterStore>>, String> {
    if let Some(path) = &args.params {
        log::info!("Using parameter file {}", path.display());
        let store = StaticParameterStore::from_file(path).map_err(|e| e.to_string())?;
        return Ok(Some(Box::new(store)));
    }
    if args.ssm {
        log::info!("Using SSM parameter store");
        let store = SsmParameterStore::new(args.region.as_deref()).await;
        return Ok(Some(Box::new(store)));
    }
    log::debug!("No parameter source, lookups deferred to deploy time");
    Ok(None)
}

fn load_config(file: &Path) -> Result<FleetConfig, String> {
    FleetConfig::load(file).map_err(|e| e.to_string())
}

async fn synthesize(file: &Path, args: &ParameterArgs) -> Result<FleetStack, String> {
    let config = load_config(file)?;
    let mut provisioner = ServiceFleetProvisioner::new(config);
    if let Some(store) = parameter_store(args).await? {
        provisioner = provisioner.with_parameter_store(store);
    }
    provisioner.synthesize().await.map_err(|e| e.to_string())
}

async fn render(file: &Path, args: &ParameterArgs) -> Result<String, String> {
    let fleet = synthesize(file, args).await?;
    log::debug!("Rendering {} resource(s)", fleet.stack.len());
    let template = TemplateRenderer::new()
        .render(&fleet.stack)
        .map_err(|e| e.to_string())?;
    to_json_string(&template).map_err(|e| e.to_string())
}

async fn run_validate(file: &Path) -> Result<(), String> {
    println!("{}", "Validating...".cyan());

    let fleet = synthesize(file, &ParameterArgs::default()).await?;
    TemplateRenderer::new()
        .validate(&fleet.stack)
        .map_err(|e| e.to_string())?;

    println!(
        "{}",
        format!(
            "✓ {} resources validated successfully.",
            fleet.stack.len()
        )
        .green()
        .bold()
    );

    for resource in fleet.stack.resources() {
        println!("  • {}", resource.id);
    }

    Ok(())
}

async fn run_synth(file: &Path, output: Option<&Path>, args: &ParameterArgs) -> Result<(), String> {
    let body = render(file, args).await?;

    match output {
        Some(path) => {
            log::info!("Writing template to {}", path.display());
            fs::write(path, format!("{}\n", body))
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!(
                "{}",
                format!("✓ Template written to {}", path.display())
                    .green()
                    .bold()
            );
        }
        None => println!("{}", body),
    }
    Ok(())
}

async fn run_plan(file: &Path, args: &ParameterArgs) -> Result<(), String> {
    let fleet = synthesize(file, args).await?;
    print_plan(&fleet);
    Ok(())
}

async fn run_diff(file: &Path, against: &Path, args: &ParameterArgs) -> Result<(), String> {
    let previous = fs::read_to_string(against)
        .map_err(|e| format!("Failed to read {}: {}", against.display(), e))?;
    let current = format!("{}\n", render(file, args).await?);
    log::debug!("Comparing fresh synthesis with {}", against.display());

    if normalize_newlines(&previous) == current {
        println!("{}", "No differences.".green());
        return Ok(());
    }

    print_diff(against, &normalize_newlines(&previous), &current);
    Ok(())
}

async fn run_params(args: &ParameterArgs) -> Result<(), String> {
    let store = parameter_store(args)
        .await?
        .ok_or_else(|| "No parameter source given, use --params <file> or --ssm".to_string())?;

    println!(
        "{}",
        format!("Checking parameters in '{}' store...", store.name()).cyan()
    );

    let mut missing = 0;
    for key in REQUIRED_KEYS {
        match store.get(key).await.map_err(|e| e.to_string())? {
            Some(value) => println!("  {} {} = {}", "✓".green(), key, value),
            None => {
                println!("  {} {} {}", "✗".red(), key, "(missing)".red());
                missing += 1;
            }
        }
    }

    if missing > 0 {
        return Err(format!(
            "{} of {} parameter(s) missing",
            missing,
            REQUIRED_KEYS.len()
        ));
    }
    println!("{}", "✓ All parameters present.".green().bold());
    Ok(())
}

fn normalize_newlines(s: &str) -> String {
    let trimmed = s.replace("\r\n", "\n");
    format!("{}\n", trimmed.trim_end())
}

fn print_plan(fleet: &FleetStack) {
    println!(
        "{}",
        format!("Fleet plan for {}:", fleet.app_name).cyan().bold()
    );

    let sorted = fleet.stack.sorted();
    let groups = fleet.stack.group_by_service();

    let mut order = vec![ResourceGroup::Shared];
    order.extend(
        fleet
            .services
            .iter()
            .map(|s| ResourceGroup::Service(s.service_name.clone())),
    );

    for group in order {
        if !groups.contains_key(&group) {
            continue;
        }
        println!();
        match &group {
            ResourceGroup::Shared => println!("{}", "Shared".bold()),
            ResourceGroup::Service(name) => {
                let priority = fleet
                    .routing_rule(name)
                    .map(|r| format!(" (rule priority {})", r.priority))
                    .unwrap_or_default();
                println!("{}{}", format!("Service {}", name).bold(), priority);
            }
        }

        for resource in sorted.iter().filter(|r| group_of(r) == group) {
            print_resource(resource);
        }
    }

    println!();
    println!("{}", fleet.stack.summary().to_string().bold());
}

fn group_of(resource: &Resource) -> ResourceGroup {
    match resource.service() {
        Some(name) => ResourceGroup::Service(name.to_string()),
        None => ResourceGroup::Shared,
    }
}

fn print_resource(resource: &Resource) {
    println!("  {} {}", "+".green().bold(), resource.id.to_string().cyan());

    let mut keys: Vec<_> = resource
        .attributes
        .keys()
        .filter(|k| !k.starts_with('_'))
        .collect();
    keys.sort();
    for key in keys {
        println!(
            "      {}: {}",
            key,
            format_value(&resource.attributes[key.as_str()])
        );
    }
    if !resource.depends_on.is_empty() {
        println!("      {}: {}", "depends_on".dimmed(), resource.depends_on.join(", "));
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut strs: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            strs.sort();
            format!("{{{}}}", strs.join(", "))
        }
        Value::ResourceRef(name, attr) => format!("{}.{}", name, attr),
        Value::Ref(name) => name.clone(),
        Value::Parameter(key) => format!("ssm:{}", key),
    }
}

fn print_diff(file: &Path, previous: &str, current: &str) {
    println!("\n{} {}:", "Diff for".cyan().bold(), file.display());

    let diff = TextDiff::from_lines(previous, current);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fleet(dir: &Path) -> PathBuf {
        let path = dir.join("fleet.yaml");
        fs::write(
            &path,
            "appName: demo\nservices:\n  - serviceName: api\n    imageUri: repo/img:tag\n    containerPort: 8080\n    desiredCount: 2\n    hostName: api.example.com\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn format_values_for_plan() {
        assert_eq!(format_value(&Value::string("api")), "\"api\"");
        assert_eq!(
            format_value(&Value::ResourceRef("LoadBalancer".into(), "DNSName".into())),
            "LoadBalancer.DNSName"
        );
        assert_eq!(
            format_value(&Value::Parameter("/network/vpc_id".into())),
            "ssm:/network/vpc_id"
        );
        assert_eq!(
            format_value(&Value::map([("b", Value::Int(2)), ("a", Value::Int(1))])),
            "{a: 1, b: 2}"
        );
    }

    #[test]
    fn newline_normalization() {
        assert_eq!(normalize_newlines("{\r\n}\r\n\r\n"), "{\n}\n");
    }

    #[tokio::test]
    async fn synth_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let fleet = write_fleet(dir.path());
        let out = dir.path().join("template.json");

        run_synth(&fleet, Some(out.as_path()), &ParameterArgs::default())
            .await
            .unwrap();

        let template: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(
            template["Resources"]["ServiceApi"]["Properties"]["ServiceName"],
            "ecs-api"
        );
    }

    #[tokio::test]
    async fn synth_with_parameter_file_resolves_values() {
        let dir = tempfile::tempdir().unwrap();
        let fleet = write_fleet(dir.path());
        let params = dir.path().join("params.json");
        let values: serde_json::Map<String, serde_json::Value> = REQUIRED_KEYS
            .iter()
            .map(|k| (k.to_string(), serde_json::Value::String(format!("v{}", k))))
            .collect();
        fs::write(&params, serde_json::Value::Object(values).to_string()).unwrap();

        let args = ParameterArgs {
            params: Some(params),
            ..Default::default()
        };
        let body = render(&fleet, &args).await.unwrap();
        assert!(!body.contains("AWS::SSM::Parameter::Value"));
        assert!(body.contains("v/network/vpc_id"));
    }

    #[tokio::test]
    async fn params_requires_a_source() {
        let err = run_params(&ParameterArgs::default()).await.unwrap_err();
        assert!(err.contains("--params"));
    }

    #[tokio::test]
    async fn params_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let params = dir.path().join("params.json");
        fs::write(&params, r#"{"/network/vpc_id": "vpc-1"}"#).unwrap();

        let args = ParameterArgs {
            params: Some(params),
            ..Default::default()
        };
        let err = run_params(&args).await.unwrap_err();
        assert_eq!(err, "7 of 8 parameter(s) missing");
    }

    #[tokio::test]
    async fn diff_against_fresh_synthesis_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let fleet = write_fleet(dir.path());
        let out = dir.path().join("template.json");
        run_synth(&fleet, Some(out.as_path()), &ParameterArgs::default())
            .await
            .unwrap();

        let previous = fs::read_to_string(&out).unwrap();
        let current = format!("{}\n", render(&fleet, &ParameterArgs::default()).await.unwrap());
        assert_eq!(normalize_newlines(&previous), current);
        run_diff(&fleet, &out, &ParameterArgs::default()).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_fleet_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.json");
        fs::write(&path, r#"{"appName": "", "services": []}"#).unwrap();

        let err = run_validate(&path).await.unwrap_err();
        assert!(err.contains("appName must not be empty"));
    }
}
