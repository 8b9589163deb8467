//! Concurrent population of the synthesis caches.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::sync::{Arc, Barrier};

use pretty_assertions::assert_eq;
use rayon::prelude::*;
use synth_ir::{FileId, SourceLocation, Span, TypeId};
use synth_types::{
    DelegateKey, EmittedType, FinalizeInput, Generation, GenerationConfig, ParamPassing, ShapeKey,
};

const WORKERS: usize = 100;

fn at(offset: u32) -> Option<SourceLocation> {
    Some(SourceLocation::new(FileId::new(0), Span::new(offset, offset + 1)))
}

#[test]
fn hundred_racing_requests_bind_one_template() {
    let generation = Generation::root(GenerationConfig::default());
    let key = ShapeKey::new(["left", "right"]);
    let barrier = Barrier::new(WORKERS);

    let templates: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|worker| {
                let (generation, key, barrier) = (&generation, &key, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    let offset = u32::try_from(worker).unwrap();
                    generation.shape_template(key, at(offset)).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(templates.iter().all(|t| Arc::ptr_eq(t, &templates[0])));
    let stats = generation.shape_stats();
    assert_eq!(stats.created, 1);
    assert!(stats.discarded <= WORKERS - 1);
    assert_eq!(stats.created + stats.discarded + stats.hits, WORKERS);
    assert_eq!(templates[0].smallest_location_key(), at(0).map(SourceLocation::order_key));
}

#[test]
fn hundred_racing_delegate_requests_bind_one_template() {
    let generation = Generation::root(GenerationConfig::default());
    let key = DelegateKey::new(&[ParamPassing::ByRef, ParamPassing::ByValue], true);
    let barrier = Barrier::new(WORKERS);

    std::thread::scope(|scope| {
        for worker in 0..WORKERS {
            let (generation, key, barrier) = (&generation, &key, &barrier);
            scope.spawn(move || {
                barrier.wait();
                let offset = u32::try_from(worker).unwrap();
                generation.delegate_template(key, at(offset)).unwrap();
            });
        }
    });

    assert_eq!(generation.local_delegate_count(), 1);
    assert!(generation.delegate_stats().discarded <= WORKERS - 1);
}

#[test]
fn parallel_population_names_like_sequential() {
    let keys: Vec<ShapeKey> = (0..64)
        .map(|i| ShapeKey::new((0..=i % 5).map(|f| format!("f{f}_{}", i / 5))))
        .collect();

    let populate = |parallel: bool| {
        let generation = Generation::root(GenerationConfig::default().with_module_name("par"));
        let request = |(i, key): (usize, &ShapeKey)| {
            let types = vec![TypeId::INT; key.field_count()];
            let offset = u32::try_from(1000 - i).unwrap();
            generation.construct_shape(key, &types, at(offset)).unwrap();
        };
        if parallel {
            keys.par_iter().enumerate().for_each(request);
        } else {
            keys.iter().enumerate().for_each(request);
        }
        let mut names = Vec::new();
        generation
            .finalize(FinalizeInput::default(), &mut |types: Vec<EmittedType>| {
                names = types.into_iter().map(|t| t.identity).collect();
            })
            .unwrap();
        names
    };

    let sequential = populate(false);
    assert_eq!(sequential.len(), keys.len());
    assert_eq!(populate(true), sequential);
}
