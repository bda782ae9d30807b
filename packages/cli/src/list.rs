use console::style;

use crate::client::ApiClient;

/// Walk every compact listing page and print one line per image.
pub fn run(client: &ApiClient) -> anyhow::Result<()> {
    let mut page = 1;
    let mut total = 0usize;

    loop {
        let result = client.list_page(page)?;
        for image in &result.images {
            println!("{}  {}", style(&image.title).bold(), image.original_url);
        }
        total += result.images.len();

        if !result.pagination.has_next {
            break;
        }
        page = result.pagination.number + 1;
    }

    println!();
    println!("{total} images");
    Ok(())
}
