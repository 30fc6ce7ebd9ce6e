// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Init command - create a new lakeflow project

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::config::PipelineConfig;

/// Run the init command
pub async fn run(name: Option<String>, verbose: bool) -> Result<()> {
    let pipeline_name = name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "ecommerce-analytics".to_string())
    });

    println!("{}", "Initializing lakeflow project...".bold());
    println!();

    if Path::new("lakeflow.yaml").exists() {
        return Err(miette::miette!(
            "lakeflow.yaml already exists. Remove it first to re-initialize."
        ));
    }

    let mut config = PipelineConfig::default();
    config.name = pipeline_name;

    let yaml = config
        .to_yaml()
        .map_err(|e| miette::miette!("Failed to render pipeline file: {}", e))?;
    std::fs::write("lakeflow.yaml", &yaml)
        .map_err(|e| miette::miette!("Failed to write lakeflow.yaml: {}", e))?;
    println!("  {} Created lakeflow.yaml", "✓".green());

    for dir in [&config.raw_dir, &config.output_dir, &config.storage.root] {
        std::fs::create_dir_all(dir)
            .map_err(|e| miette::miette!("Failed to create directory '{}': {}", dir.display(), e))?;
        println!("  {} Created {}/", "✓".green(), dir.display());
    }

    create_sample_files(&config)?;

    println!();
    println!("{}", "Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to adjust the pipeline", "lakeflow.yaml".cyan());
    println!("  2. Replace the sample CSVs in {}", config.raw_dir.display().to_string().cyan());
    println!("  3. Run {} to execute the pipeline", "lakeflow run".cyan());
    println!();

    if verbose {
        println!("{}", "Generated pipeline:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", yaml.dimmed());
    }

    Ok(())
}

/// Write one sample CSV per entity. The samples deliberately contain dirty
/// values (mixed-case email, out-of-range rating, duplicate key) so a first
/// run demonstrates the cleaning rules.
fn create_sample_files(config: &PipelineConfig) -> Result<()> {
    let samples: &[(&str, &str)] = &[
        (
            "customers",
            "customer_id,name,email,signup_date\n\
             c1,Alice Moreau,Alice.Moreau@Example.COM,2024-01-15\n\
             c2,Ben Okafor,ben@example.com,2024-02-03\n\
             c3,  Chiara Rossi ,chiara@example.com,2024-02-20\n\
             c1,Alice Duplicate,alice.dup@example.com,2024-03-01\n",
        ),
        (
            "products",
            "product_id,name,category,price\n\
             p1,Desk Lamp,home,34.99\n\
             p2,Mechanical Keyboard,electronics,129.00\n\
             p3,Studio Monitor,electronics,449.00\n\
             p4,Espresso Machine,kitchen,-5.00\n",
        ),
        (
            "orders",
            "order_id,customer_id,order_date,status,total_amount\n\
             o1,c1,2024-03-05,SHIPPED,34.99\n\
             o2,c2,2024-03-12,,129.00\n\
             o3,c3,2024-04-02,delivered,483.99\n\
             o4,c9,2024-04-10,pending,12.00\n",
        ),
        (
            "order_items",
            "order_id,product_id,quantity,unit_price\n\
             o1,p1,1,34.99\n\
             o2,p2,1,129.00\n\
             o3,p3,1,449.00\n\
             o3,p1,0,34.99\n",
        ),
        (
            "reviews",
            "review_id,product_id,rating,text,review_date\n\
             r1,p1,5,Lovely warm light,2024-03-20\n\
             r2,p2,7,Clacky in the best way,2024-03-25\n\
             r3,p3,3, decent but pricey ,2024-04-15\n",
        ),
    ];

    for (entity, content) in samples {
        let path = config.raw_path(entity);
        if path.exists() {
            continue;
        }
        std::fs::write(&path, content)
            .map_err(|e| miette::miette!("Failed to write sample '{}': {}", path.display(), e))?;
        println!("  {} Created {}", "✓".green(), path.display());
    }

    Ok(())
}
