/// Default root-level fixture: every `redis.Redis` connection inside the
/// sandbox shares one per-process in-memory server, and workers execute jobs
/// in-process so results land in that server instead of a forked copy.
pub const DEFAULT_FIXTURE: &str = r#"import fakeredis
import redis as redis_module

_server = fakeredis.FakeServer()


class _FakeRedis(fakeredis.FakeRedis):
    def __init__(self, host="localhost", port=6379, db=0, **kw):
        kw.pop("decode_responses", None)
        super().__init__(server=_server, db=db, **kw)


redis_module.Redis = _FakeRedis
redis_module.StrictRedis = _FakeRedis

import rq
import rq.worker

rq.Worker = rq.worker.SimpleWorker
rq.worker.Worker = rq.worker.SimpleWorker
"#;
