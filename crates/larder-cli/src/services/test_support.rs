//! Fixtures for service, API and tool server tests.

#![allow(clippy::unwrap_used)]

use std::fs;

use larder_core::RecipeStore;
use larder_core::store::{RECIPE_FILE, RECIPES_DIR, recipe_path};
use larder_github::memory::MemoryRemote;
use larder_github::{Committer, RepoConfig};
use tempfile::TempDir;

use super::RecipeService;

pub const PHO: &str = "---
title: Beef Pho
description: Slow broth
tags: [dinner, asian]
ingredients:
  - item: beef bones
created_at: 2024-01-10
updated_at: 2025-02-01
---

Simmer overnight.
";

pub const TART: &str = "---
title: Lemon Tart
tags: [dessert, Dinner]
ingredients:
  - item: lemons
created_at: 2024-03-01
updated_at: 2024-03-01
---
";

/// A content directory with two recipes, mirrored on a remote `main` branch.
pub struct Fixture {
    temp: TempDir,
}

impl Fixture {
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        for (slug, text) in [("pho", PHO), ("tart", TART)] {
            let dir = temp.path().join(RECIPES_DIR).join(slug);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(RECIPE_FILE), text).unwrap();
        }
        Self { temp }
    }

    pub fn store(&self) -> RecipeStore {
        RecipeStore::new(self.temp.path())
    }

    pub fn remote() -> MemoryRemote {
        let remote = MemoryRemote::new();
        remote.seed(
            "main",
            &[
                ("README.md", "# Recipes\n"),
                (recipe_path("pho").as_str(), PHO),
                (recipe_path("tart").as_str(), TART),
            ],
        );
        remote
    }

    pub fn service(&self) -> RecipeService<MemoryRemote> {
        self.service_with(Self::remote())
    }

    pub fn service_with(&self, remote: MemoryRemote) -> RecipeService<MemoryRemote> {
        let committer = Committer::new(remote, RepoConfig::new("octo", "recipes", "main"));
        RecipeService::new(self.store(), Ok(committer))
    }
}
