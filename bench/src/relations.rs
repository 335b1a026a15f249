//! Relationship queries over two small related-table schemas.
//!
//! - catalog: categories ← products ← reviews (one-to-many chains)
//! - people: persons → addresses (one-to-one), persons ↔ hobbies (many-to-many)
//!
//! Each timed operation filters across a join, updates the row it found,
//! verifies the update and, for the catalog, restores the original value so
//! repetitions see the same data.

use anyhow::{bail, Result};
use harness::Operation;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection, OptionalExtension};

pub const CATALOG_SEED: u64 = 0x5EED_0000_0000_0003;
pub const PEOPLE_SEED: u64 = 0x5EED_0000_0000_0004;

pub const TARGET_CATEGORY: &str = "Electronics";
pub const TARGET_RATING: i64 = 5;
pub const TARGET_CITY: &str = "New York";
pub const TARGET_HOBBY: &str = "Reading";

pub const SCHEMA: &str = "
    DROP TABLE IF EXISTS person_hobbies;
    DROP TABLE IF EXISTS hobbies;
    DROP TABLE IF EXISTS addresses;
    DROP TABLE IF EXISTS persons;
    DROP TABLE IF EXISTS reviews;
    DROP TABLE IF EXISTS products;
    DROP TABLE IF EXISTS categories;

    CREATE TABLE categories (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        slug VARCHAR(50) UNIQUE NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE products (
        id INTEGER PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        description TEXT NOT NULL,
        price REAL NOT NULL,
        stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
        category_id INTEGER NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX idx_products_category ON products (category_id);
    CREATE TABLE reviews (
        id INTEGER PRIMARY KEY,
        product_id INTEGER NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        author_name VARCHAR(100) NOT NULL,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        comment TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX idx_reviews_product ON reviews (product_id);

    CREATE TABLE persons (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        age INTEGER NOT NULL,
        email VARCHAR(254) UNIQUE NOT NULL,
        bio TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE addresses (
        id INTEGER PRIMARY KEY,
        person_id INTEGER UNIQUE NOT NULL REFERENCES persons (id) ON DELETE CASCADE,
        street VARCHAR(200) NOT NULL,
        city VARCHAR(100) NOT NULL,
        state VARCHAR(100) NOT NULL,
        zip_code VARCHAR(20) NOT NULL,
        country VARCHAR(100) NOT NULL
    );
    CREATE TABLE hobbies (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE person_hobbies (
        person_id INTEGER NOT NULL REFERENCES persons (id) ON DELETE CASCADE,
        hobby_id INTEGER NOT NULL REFERENCES hobbies (id) ON DELETE CASCADE,
        PRIMARY KEY (person_id, hobby_id)
    );
";

/// Row counts of the large catalog. Each count includes the fixtures:
/// the "Electronics" category, the "Laptop" product and its first review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSize {
    pub categories: usize,
    pub products: usize,
    pub reviews: usize,
}

pub const DEFAULT_CATEGORIES: usize = 100;
pub const DEFAULT_PRODUCTS: usize = 10_000;
pub const DEFAULT_REVIEWS: usize = 10_000;

impl Default for CatalogSize {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES,
            products: DEFAULT_PRODUCTS,
            reviews: DEFAULT_REVIEWS,
        }
    }
}

/// Dataset scale for the relationship scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// One matching row per chain, nothing else.
    Small,
    /// The small fixtures plus a generated catalog and filler persons.
    Large(CatalogSize),
}

impl Dataset {
    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Small => "small",
            Dataset::Large(_) => "large",
        }
    }
}

pub const LARGE_PERSONS: usize = 5_000;

/// Five-star reviews the laptop fixture is guaranteed in the large catalog.
pub const LAPTOP_FIVE_STAR_REVIEWS: usize = 10;

const LAPTOP_REVIEWERS: [&str; LAPTOP_FIVE_STAR_REVIEWS] = [
    "John", "Jane", "Bob", "Alice", "David", "Emily", "Michael", "Sarah", "Robert", "Lisa",
];
const LAPTOP_COMMENTS: [&str; LAPTOP_FIVE_STAR_REVIEWS] = [
    "Perfect laptop! Exactly what I needed.",
    "Amazing performance and quality.",
    "Best laptop I've ever owned.",
    "Exceeded my expectations!",
    "Great value for the price.",
    "Super fast and reliable.",
    "Excellent build quality.",
    "The display is stunning!",
    "Battery life is incredible.",
    "Keyboard feels great to type on.",
];

/// Recreate every relationship table and fill them for `dataset`.
pub fn setup(conn: &Connection, dataset: Dataset) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    let tx = conn.unchecked_transaction()?;
    match dataset {
        Dataset::Small => {
            populate_small_catalog(&tx)?;
            populate_people_fixtures(&tx)?;
        }
        Dataset::Large(size) => {
            populate_large_catalog(&tx, &size)?;
            populate_people_fixtures(&tx)?;
            populate_people_filler(&tx, LARGE_PERSONS)?;
        }
    }
    tx.commit()?;
    conn.execute_batch("ANALYZE")?;
    log::debug!("relations: {} dataset ready", dataset.label());
    Ok(())
}

fn insert_category(conn: &Connection, name: &str, description: &str, slug: &str) -> Result<i64> {
    conn.prepare_cached("INSERT INTO categories (name, description, slug) VALUES (?1, ?2, ?3)")?
        .execute(params![name, description, slug])?;
    Ok(conn.last_insert_rowid())
}

fn insert_product(
    conn: &Connection,
    name: &str,
    price: f64,
    stock: i64,
    category_id: i64,
    is_active: bool,
) -> Result<i64> {
    conn.prepare_cached(
        "INSERT INTO products (name, description, price, stock, category_id, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?
    .execute(params![
        name,
        format!("Description for {name}"),
        price,
        stock,
        category_id,
        is_active
    ])?;
    Ok(conn.last_insert_rowid())
}

fn insert_review(
    conn: &Connection,
    product_id: i64,
    author: &str,
    rating: i64,
    comment: &str,
) -> Result<()> {
    conn.prepare_cached(
        "INSERT INTO reviews (product_id, author_name, rating, comment) VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![product_id, author, rating, comment])?;
    Ok(())
}

fn populate_small_catalog(conn: &Connection) -> Result<()> {
    let electronics = insert_category(
        conn,
        TARGET_CATEGORY,
        "Electronic devices and gadgets",
        "electronics",
    )?;
    let laptop = insert_product(conn, "Laptop", 999.99, 10, electronics, true)?;
    insert_review(conn, laptop, "Test Reviewer", 5, "Excellent laptop for testing!")?;
    Ok(())
}

fn populate_large_catalog(conn: &Connection, size: &CatalogSize) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(CATALOG_SEED);

    let electronics = insert_category(
        conn,
        TARGET_CATEGORY,
        "Electronic devices and gadgets",
        "electronics",
    )?;
    let mut categories = Vec::with_capacity(size.categories.max(1));
    categories.push(electronics);
    for i in 1..size.categories {
        categories.push(insert_category(
            conn,
            &format!("Category {i}"),
            &format!("Description for category {i}"),
            &format!("category-{i}"),
        )?);
    }

    let laptop = insert_product(conn, "Laptop", 999.99, 10, electronics, true)?;
    let filler_products = size.products.saturating_sub(1);
    let mut products = Vec::with_capacity(filler_products + 1);
    products.push(laptop);
    for i in 0..filler_products {
        // one in ten generated products is electronics
        let category = if i < filler_products / 10 {
            electronics
        } else {
            categories[rng.gen_range(0..categories.len())]
        };
        products.push(insert_product(
            conn,
            &format!("Product {}", i + 1),
            rng.gen_range(10.0..2000.0),
            rng.gen_range(0..=100),
            category,
            rng.gen_range(0..4) != 0,
        )?);
    }

    insert_review(conn, laptop, "Test Reviewer", 5, "Excellent laptop for testing!")?;
    let filler_reviews = size.reviews.saturating_sub(1);
    for i in 0..filler_reviews {
        // one in a hundred generated reviews is for the laptop
        let product = if i < filler_reviews / 100 {
            laptop
        } else {
            products[rng.gen_range(0..products.len())]
        };
        insert_review(
            conn,
            product,
            &format!("Reviewer {}", i + 1),
            rng.gen_range(1..=5),
            &format!("Review comment {}", i + 1),
        )?;
    }

    let five_star: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE product_id = ?1 AND rating = ?2",
        params![laptop, TARGET_RATING],
        |r| r.get(0),
    )?;
    let missing = LAPTOP_FIVE_STAR_REVIEWS.saturating_sub(five_star as usize);
    for (author, comment) in LAPTOP_REVIEWERS.iter().zip(LAPTOP_COMMENTS).take(missing) {
        insert_review(conn, laptop, author, TARGET_RATING, comment)?;
    }
    log::debug!(
        "relations: catalog {} categories, {} products, {} reviews (+{missing} laptop)",
        categories.len(),
        products.len(),
        size.reviews
    );
    Ok(())
}

fn insert_person(conn: &Connection, name: &str, age: i64, email: &str, bio: &str) -> Result<i64> {
    conn.prepare_cached("INSERT INTO persons (name, age, email, bio) VALUES (?1, ?2, ?3, ?4)")?
        .execute(params![name, age, email, bio])?;
    Ok(conn.last_insert_rowid())
}

fn insert_address(
    conn: &Connection,
    person_id: i64,
    street: &str,
    city: &str,
    state: &str,
    zip: &str,
) -> Result<()> {
    conn.prepare_cached(
        "INSERT INTO addresses (person_id, street, city, state, zip_code, country)
         VALUES (?1, ?2, ?3, ?4, ?5, 'USA')",
    )?
    .execute(params![person_id, street, city, state, zip])?;
    Ok(())
}

fn insert_hobby(conn: &Connection, name: &str, description: &str) -> Result<i64> {
    conn.prepare_cached("INSERT INTO hobbies (name, description) VALUES (?1, ?2)")?
        .execute(params![name, description])?;
    Ok(conn.last_insert_rowid())
}

fn link_hobby(conn: &Connection, person_id: i64, hobby_id: i64) -> Result<()> {
    conn.prepare_cached("INSERT OR IGNORE INTO person_hobbies (person_id, hobby_id) VALUES (?1, ?2)")?
        .execute(params![person_id, hobby_id])?;
    Ok(())
}

fn populate_people_fixtures(conn: &Connection) -> Result<()> {
    let john = insert_person(conn, "John Doe", 30, "john@example.com", "Test bio 1")?;
    let jane = insert_person(conn, "Jane Smith", 25, "jane@example.com", "Test bio 2")?;
    let bob = insert_person(conn, "Bob Johnson", 40, "bob@example.com", "Test bio 3")?;

    insert_address(conn, john, "123 Main St", TARGET_CITY, "NY", "10001")?;
    insert_address(conn, jane, "456 Park Ave", "Boston", "MA", "02108")?;
    insert_address(conn, bob, "789 Oak St", "Chicago", "IL", "60601")?;

    let reading = insert_hobby(conn, TARGET_HOBBY, "Reading books")?;
    let swimming = insert_hobby(conn, "Swimming", "Swimming in the pool")?;
    let hiking = insert_hobby(conn, "Hiking", "Hiking in mountains")?;

    for (person, hobby) in [
        (john, reading),
        (john, swimming),
        (jane, swimming),
        (jane, hiking),
        (bob, reading),
        (bob, hiking),
    ] {
        link_hobby(conn, person, hobby)?;
    }
    Ok(())
}

/// Persons that never match the target city, each with one or two hobbies.
fn populate_people_filler(conn: &Connection, count: usize) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(PEOPLE_SEED);

    let mut hobbies: Vec<i64> = conn
        .prepare("SELECT id FROM hobbies")?
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    for i in 0..20 {
        hobbies.push(insert_hobby(conn, &format!("Hobby {i}"), "")?);
    }

    for i in 0..count {
        let person = insert_person(
            conn,
            &format!("Person {i}"),
            rng.gen_range(18..90),
            &format!("person{i}@example.com"),
            "",
        )?;
        insert_address(
            conn,
            person,
            &format!("{i} Filler St"),
            &format!("City {}", i % 50),
            "ST",
            &format!("{:05}", i % 100_000),
        )?;
        let picks = rng.gen_range(1..=2);
        for &hobby in hobbies.choose_multiple(&mut rng, picks) {
            link_hobby(conn, person, hobby)?;
        }
    }
    Ok(())
}

/// Find a product in the target category with a top review, change its
/// stock, verify the write, then put the old value back.
pub struct ProductStockRoundTrip<'a> {
    conn: &'a Connection,
}

impl<'a> ProductStockRoundTrip<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl Operation for ProductStockRoundTrip<'_> {
    /// Id of the product that was touched.
    type Output = i64;

    fn run(&mut self) -> Result<i64> {
        let found: Option<(i64, i64)> = self
            .conn
            .prepare_cached(
                "SELECT p.id, p.stock FROM products p
                 JOIN categories c ON c.id = p.category_id
                 JOIN reviews r ON r.product_id = p.id
                 WHERE c.name = ?1 AND r.rating = ?2
                 ORDER BY p.id LIMIT 1",
            )?
            .query_row(params![TARGET_CATEGORY, TARGET_RATING], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .optional()?;

        let Some((id, original_stock)) = found else {
            bail!("no product in {TARGET_CATEGORY} with a {TARGET_RATING}-star review");
        };

        let new_stock = if original_stock > 0 {
            original_stock - 1
        } else {
            original_stock + 1
        };
        let mut update = self
            .conn
            .prepare_cached("UPDATE products SET stock = ?1 WHERE id = ?2")?;
        update.execute(params![new_stock, id])?;

        let stored: i64 = self
            .conn
            .prepare_cached("SELECT stock FROM products WHERE id = ?1")?
            .query_row(params![id], |r| r.get(0))?;
        if stored != new_stock {
            bail!("product {id}: stock is {stored}, expected {new_stock}");
        }

        update.execute(params![original_stock, id])?;
        Ok(id)
    }
}

/// Find a person in the target city with the target hobby and rewrite the bio.
pub struct PersonBioUpdate<'a> {
    conn: &'a Connection,
    bio: String,
}

impl<'a> PersonBioUpdate<'a> {
    pub fn new(conn: &'a Connection, bio: &str) -> Self {
        Self {
            conn,
            bio: bio.to_string(),
        }
    }
}

impl Operation for PersonBioUpdate<'_> {
    /// Name of the person that was updated.
    type Output = String;

    fn run(&mut self) -> Result<String> {
        let found: Option<(i64, String)> = self
            .conn
            .prepare_cached(
                "SELECT p.id, p.name FROM persons p
                 JOIN addresses a ON a.person_id = p.id
                 JOIN person_hobbies ph ON ph.person_id = p.id
                 JOIN hobbies h ON h.id = ph.hobby_id
                 WHERE a.city = ?1 AND h.name = ?2
                 ORDER BY p.id LIMIT 1",
            )?
            .query_row(params![TARGET_CITY, TARGET_HOBBY], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .optional()?;

        let Some((id, name)) = found else {
            bail!("nobody in {TARGET_CITY} lists {TARGET_HOBBY} as a hobby");
        };

        self.conn
            .prepare_cached("UPDATE persons SET bio = ?1 WHERE id = ?2")?
            .execute(params![self.bio, id])?;

        let stored: String = self
            .conn
            .prepare_cached("SELECT bio FROM persons WHERE id = ?1")?
            .query_row(params![id], |r| r.get(0))?;
        if stored != self.bio {
            bail!("person {id}: bio was not updated");
        }
        Ok(name)
    }
}
