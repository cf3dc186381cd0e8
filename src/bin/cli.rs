#![cfg(not(tarpaulin_include))]

use interactive_grid::cache::GridCache;
use interactive_grid::client::HttpGridApi;
use interactive_grid::config::ClientConfig;
use interactive_grid::view::{self, CellInput, HoverState};
use std::env;
use std::io::{self, Write};

fn parse_pair(rest: &[&str]) -> Option<(i32, i32)> {
    match rest {
        [row, column] => Some((row.parse().ok()?, column.parse().ok()?)),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let config = ClientConfig::from_env().with_args(&args);
    let cache = GridCache::new(HttpGridApi::new(config.base_url.clone()), config.grid_size);
    let mut hover = HoverState::default();

    println!("Connecting to {}", cache.api().base_url());
    if let Err(e) = cache.load().await {
        eprintln!("{} ({})", cache.error().unwrap_or_default(), e);
    }

    let mut status = String::from("ok");
    loop {
        print!("{}", view::render_text(&cache.dense(), hover.hovered()));
        print!("({}) > ", status);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        cache.clear_error();

        status = match words.as_slice() {
            [] => String::from("ok"),
            ["q"] => break,
            ["help"] => {
                println!("Commands:");
                println!("  t <row> <col>: Toggle a cell");
                println!("  h <row> <col>: Hover a cell");
                println!("  l: Leave the grid (clear hover)");
                println!("  enter | space: Toggle the hovered cell");
                println!("  r: Re-read the grid from the server");
                println!("  reset: Turn cells off in activation order");
                println!("  clear: Reset every cell at once");
                println!("  q: Quit");
                String::from("ok")
            }
            ["t", rest @ ..] => match parse_pair(rest) {
                Some((row, column)) => match cache.toggle(row, column).await {
                    Ok(cell) => format!("({}, {}) active={}", cell.row, cell.column, cell.is_active),
                    Err(e) => format!("{} {}", cache.error().unwrap_or_default(), e),
                },
                None => String::from("usage: t <row> <col>"),
            },
            ["h", rest @ ..] => match parse_pair(rest) {
                Some((row, column)) => {
                    hover.enter(row, column);
                    String::from("ok")
                }
                None => String::from("usage: h <row> <col>"),
            },
            ["l"] => {
                hover.leave();
                String::from("ok")
            }
            [key @ ("enter" | "space")] => {
                let input = CellInput::Key(if *key == "enter" { "Enter".into() } else { " ".into() });
                match hover.hovered() {
                    Some(at) if input.toggles() => match cache.toggle(at.row, at.column).await {
                        Ok(_) => String::from("ok"),
                        Err(e) => format!("{} {}", cache.error().unwrap_or_default(), e),
                    },
                    _ => String::from("nothing hovered"),
                }
            }
            ["r"] => match cache.refresh().await {
                Ok(_) => String::from("ok"),
                Err(e) => e.to_string(),
            },
            ["reset"] => match cache.reset_animated(config.reset_step).await {
                Ok(cells) => format!("{} cells reset", cells.len()),
                Err(e) => format!("{} {}", cache.error().unwrap_or_default(), e),
            },
            ["clear"] => match cache.reset_all().await {
                Ok(()) => String::from("ok"),
                Err(e) => format!("{} {}", cache.error().unwrap_or_default(), e),
            },
            _ => String::from("invalid command"),
        };
    }

    Ok(())
}
