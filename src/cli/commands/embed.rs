//! homeseek embed - Test the embedding provider
//!
//! Utility command for checking credentials and vector shape.

use clap::Args;
use colored::Colorize;

use super::emit_robot;
use crate::app::AppContext;
use crate::embeddings::QueryEmbeddingService;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Texts to embed (blank entries are skipped)
    #[arg(required = true)]
    pub texts: Vec<String>,

    /// Show full embedding vectors (default: summary only)
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, serde::Serialize)]
struct VectorStats {
    len: usize,
    min: f32,
    max: f32,
    mean: f32,
    l2_norm: f32,
}

fn stats(vector: &[f32]) -> VectorStats {
    let (min, max, sum) = vector
        .iter()
        .fold((f32::MAX, f32::MIN, 0.0f32), |acc, &x| (acc.0.min(x), acc.1.max(x), acc.2 + x));
    let len = vector.len();
    VectorStats {
        len,
        min: if len == 0 { 0.0 } else { min },
        max: if len == 0 { 0.0 } else { max },
        mean: if len == 0 { 0.0 } else { sum / len as f32 },
        l2_norm: vector.iter().map(|x| x * x).sum::<f32>().sqrt(),
    }
}

pub fn run(ctx: &AppContext, args: &EmbedArgs) -> Result<()> {
    let vectors = QueryEmbeddingService::scoped(
        std::sync::Arc::clone(&ctx.embedding_provider),
        ctx.embedding_credential(),
        |service| service.batch_embed_queries(&args.texts),
    )?;
    let kept: Vec<&String> = args.texts.iter().filter(|t| !t.trim().is_empty()).collect();

    if ctx.robot_mode {
        let items: Vec<serde_json::Value> = kept
            .iter()
            .zip(&vectors)
            .map(|(text, vector)| {
                let mut item = serde_json::json!({ "text": text, "stats": stats(vector) });
                if args.full {
                    item["embedding"] = serde_json::json!(vector);
                }
                item
            })
            .collect();
        return emit_robot(&serde_json::json!({
            "provider": ctx.embedding_provider.name(),
            "dims": ctx.embedding_provider.dims(),
            "embeddings": items,
        }));
    }

    println!("{}", "Embedding Provider".bold());
    println!("  Name: {}", ctx.embedding_provider.name().cyan());
    println!("  Dimensions: {}", ctx.embedding_provider.dims().to_string().cyan());
    println!();

    for (text, vector) in kept.iter().zip(&vectors) {
        let s = stats(vector);
        println!("\"{}\"", text.green());
        println!(
            "  len {}  min {:.6}  max {:.6}  mean {:.6}  norm {:.6}",
            s.len, s.min, s.max, s.mean, s.l2_norm
        );
        if args.full {
            println!("  {vector:?}");
        }
    }
    Ok(())
}
