// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

pub mod cfg;
pub mod cmdgen;
pub mod dispatch;
pub mod models;
pub mod target;
pub mod utils;
