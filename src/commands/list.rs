//! List and show posts

use anyhow::Result;

use crate::Site;

/// Print every post, most recently modified first
pub fn run(site: &Site) -> Result<()> {
    let posts = site.store().list_posts()?;
    let published = posts.iter().filter(|p| p.meta.published).count();

    println!("Posts ({}, {} published):", posts.len(), published);
    for post in posts {
        println!(
            "  {} {} - {} [{}]",
            if post.meta.published { "*" } else { " " },
            post.meta.modified_at.format("%Y-%m-%d %H:%M"),
            post.meta.title,
            post.slug
        );
    }
    Ok(())
}

/// Print one post with its front-matter fields
pub fn show(site: &Site, slug: &str) -> Result<()> {
    let post = site.store().load_post(slug)?;
    println!("title:       {}", post.title);
    println!("slug:        {}", post.slug);
    println!("published:   {}", post.published);
    println!("created_at:  {}", post.created_at.to_rfc3339());
    println!("modified_at: {}", post.modified_at.to_rfc3339());
    println!();
    print!("{}", post.body);
    Ok(())
}
